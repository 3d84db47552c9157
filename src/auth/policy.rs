use crate::error::ApiError;
use crate::store::Role;

/// Every protected operation the service exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateEntry,
    UpdateEntry,
    DeleteEntry,
    ListOwn,
    FindEntry,
    MonthBalance,
    DayEntries,
    SearchByOwnerName,
    GetUser,
    UpdateUser,
    DeactivateUser,
    UpdateProfile,
}

/// Role requirement for one operation. An empty set admits any
/// authenticated identity.
pub struct Policy {
    pub operation: Operation,
    pub required: &'static [Role],
}

const ANY_USER: &[Role] = &[Role::User, Role::Admin];
const ADMIN_ONLY: &[Role] = &[Role::Admin];

pub const POLICIES: &[Policy] = &[
    Policy { operation: Operation::CreateEntry, required: ANY_USER },
    Policy { operation: Operation::UpdateEntry, required: ANY_USER },
    Policy { operation: Operation::DeleteEntry, required: ANY_USER },
    Policy { operation: Operation::ListOwn, required: ANY_USER },
    Policy { operation: Operation::FindEntry, required: ANY_USER },
    Policy { operation: Operation::MonthBalance, required: ANY_USER },
    Policy { operation: Operation::DayEntries, required: ANY_USER },
    Policy { operation: Operation::SearchByOwnerName, required: ADMIN_ONLY },
    Policy { operation: Operation::GetUser, required: ADMIN_ONLY },
    Policy { operation: Operation::UpdateUser, required: ADMIN_ONLY },
    Policy { operation: Operation::DeactivateUser, required: ADMIN_ONLY },
    Policy { operation: Operation::UpdateProfile, required: &[] },
];

pub fn required_roles(operation: Operation) -> &'static [Role] {
    POLICIES
        .iter()
        .find(|p| p.operation == operation)
        .map(|p| p.required)
        .unwrap_or(&[])
}

/// Pure policy check, no IO: the authorization stage of the request gate.
/// Runs after authentication, so a failure here means "authenticated but
/// not allowed" and is distinct from an authentication failure.
pub fn authorize(operation: Operation, role: Role) -> Result<(), ApiError> {
    let required = required_roles(operation);
    if required.is_empty() || required.contains(&role) {
        Ok(())
    } else {
        Err(ApiError::authorization("insufficient role"))
    }
}
