//! Generic record status shared by catalogue, enterprise, role and user rows

string_enum! {
    /// Lifecycle status of a record
    pub enum Status {
        #[default]
        Active => "ACTIVE",
        Inactive => "INACTIVE",
        Pending => "PENDING",
        Expired => "EXPIRED",
        Revoked => "REVOKED",
        Suspended => "SUSPENDED",
    }
}

impl Status {
    pub fn is_active(&self) -> bool {
        matches!(self, Status::Active)
    }
}
