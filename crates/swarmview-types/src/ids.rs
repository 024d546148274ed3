//! Type-safe identifier wrappers.
//!
//! A [`SessionId`] tags one simulation run; every snapshot and side-channel
//! message carries one, and the playback engine drops anything not tagged
//! with the currently active session. Session ids use UUID v7 (time-ordered)
//! so overlapping runs sort by creation time in logs.
//!
//! A [`RobotId`] identifies one robot *within* a run. Robot ids are small
//! integers assigned by the remote simulator and are only unique per session.

use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Opaque identifier for one simulation run (a session).
    SessionId
}

/// Identifier of one robot within a session.
///
/// Serialized transparently as its inner integer, which also makes it usable
/// as a JSON object key in the snapshot wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export, export_to = "bindings/")]
pub struct RobotId(pub u32);

impl RobotId {
    /// Return the inner integer value.
    pub const fn into_inner(self) -> u32 {
        self.0
    }
}

impl fmt::Display for RobotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for RobotId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}
