#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleEvent {
    /// The user flipped the appearance by hand.
    ManualToggle,
    /// A tick observed the manual appearance settle on a configured pair.
    Confirm,
}
