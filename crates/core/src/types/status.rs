//! Status enums for orders and admin users.

use serde::{Deserialize, Serialize};

/// Where an order is in its lifecycle.
///
/// Orders are stored with a `complete` flag; an open order doubles as the
/// customer's cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Still acting as a cart.
    #[default]
    Open,
    /// Payment total reconciled with the cart total.
    Complete,
}

impl OrderStatus {
    /// Map the stored `complete` flag (nullable in the schema) to a status.
    #[must_use]
    pub fn from_complete(complete: Option<bool>) -> Self {
        if complete.unwrap_or(false) {
            Self::Complete
        } else {
            Self::Open
        }
    }

    /// Human-readable label for listings.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Open => "Pending",
            Self::Complete => "Complete",
        }
    }
}

/// Admin role with different permission levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "admin.admin_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    /// Catalog management plus admin user management.
    SuperAdmin,
    /// Catalog management.
    Admin,
    /// Read-only access.
    Viewer,
}

impl AdminRole {
    /// Whether this role may create, edit or delete catalog rows.
    #[must_use]
    pub const fn can_write(&self) -> bool {
        matches!(self, Self::SuperAdmin | Self::Admin)
    }
}

impl std::fmt::Display for AdminRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SuperAdmin => write!(f, "super_admin"),
            Self::Admin => write!(f, "admin"),
            Self::Viewer => write!(f, "viewer"),
        }
    }
}

impl std::str::FromStr for AdminRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super_admin" => Ok(Self::SuperAdmin),
            "admin" => Ok(Self::Admin),
            "viewer" => Ok(Self::Viewer),
            _ => Err(format!("invalid admin role: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn null_complete_is_open() {
        assert_eq!(OrderStatus::from_complete(None), OrderStatus::Open);
        assert_eq!(OrderStatus::from_complete(Some(false)), OrderStatus::Open);
        assert_eq!(OrderStatus::from_complete(Some(true)), OrderStatus::Complete);
    }

    #[test]
    fn role_round_trips_through_strings() {
        for role in [AdminRole::SuperAdmin, AdminRole::Admin, AdminRole::Viewer] {
            assert_eq!(role.to_string().parse::<AdminRole>().unwrap(), role);
        }
        assert!("owner".parse::<AdminRole>().is_err());
    }

    #[test]
    fn viewers_cannot_write() {
        assert!(AdminRole::Admin.can_write());
        assert!(!AdminRole::Viewer.can_write());
    }
}
