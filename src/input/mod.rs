pub mod normal_mode;
pub mod search_mode;

/// Key handling mutates state directly; anything that needs the backend or
/// the clipboard comes back as an action for the session loop to run.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Reload,
    LoadDashboard,
    ToggleTrack(String),
    CopyGoogleUrl(String),
    SaveIcs(String),
    CopyLink(String),
}
