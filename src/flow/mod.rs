/// Frame history and coarse motion estimation for the drift policy.
pub mod estimator;
