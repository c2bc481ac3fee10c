/// Vertical movement state of a first-person camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AirState {
    Grounded,
    Airborne,
}
