/// Admin capabilities on the community platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminCapability {
    /// Approve or reject pending businesses, services and tips
    ModerateSubmissions,

    /// Remove submissions outright
    DeleteSubmissions,

    /// Publish, cancel and complete events, record attendance
    ManageEvents,
}

impl AdminCapability {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminCapability::ModerateSubmissions => "moderate_submissions",
            AdminCapability::DeleteSubmissions => "delete_submissions",
            AdminCapability::ManageEvents => "manage_events",
        }
    }
}
