//! Shared domain enumerations aligned with the remote API's enum strings.

use std::fmt;
use std::str::FromStr;

use quire_api_types::{CommentStatusDto, PostStatusDto, UserRoleDto};
use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    Draft,
    Published,
    Archived,
}

impl PostStatus {
    pub const ALL: [PostStatus; 3] = [Self::Draft, Self::Published, Self::Archived];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Archived => "archived",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Published => "Published",
            Self::Archived => "Archived",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentStatus {
    Pending,
    Approved,
    Rejected,
}

impl CommentStatus {
    pub const ALL: [CommentStatus; 3] = [Self::Pending, Self::Approved, Self::Rejected];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Author,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Author => "author",
        }
    }
}

macro_rules! impl_status_text {
    ($ty:ident, $entity:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = DomainError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                let needle = value.trim();
                Self::ALL
                    .into_iter()
                    .find(|candidate| candidate.as_str().eq_ignore_ascii_case(needle))
                    .ok_or_else(|| {
                        DomainError::validation(format!("unknown {} `{value}`", $entity))
                    })
            }
        }
    };
}

impl_status_text!(PostStatus, "post status");
impl_status_text!(CommentStatus, "comment status");

impl From<PostStatusDto> for PostStatus {
    fn from(value: PostStatusDto) -> Self {
        match value {
            PostStatusDto::Draft => Self::Draft,
            PostStatusDto::Published => Self::Published,
            PostStatusDto::Archived => Self::Archived,
        }
    }
}

impl From<PostStatus> for PostStatusDto {
    fn from(value: PostStatus) -> Self {
        match value {
            PostStatus::Draft => Self::Draft,
            PostStatus::Published => Self::Published,
            PostStatus::Archived => Self::Archived,
        }
    }
}

impl From<CommentStatusDto> for CommentStatus {
    fn from(value: CommentStatusDto) -> Self {
        match value {
            CommentStatusDto::Pending => Self::Pending,
            CommentStatusDto::Approved => Self::Approved,
            CommentStatusDto::Rejected => Self::Rejected,
        }
    }
}

impl From<UserRoleDto> for UserRole {
    fn from(value: UserRoleDto) -> Self {
        match value {
            UserRoleDto::Admin => Self::Admin,
            UserRoleDto::Author => Self::Author,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_parse_case_insensitively() {
        assert_eq!("Published".parse::<PostStatus>().unwrap(), PostStatus::Published);
        assert_eq!(" pending ".parse::<CommentStatus>().unwrap(), CommentStatus::Pending);
        assert!("scheduled".parse::<PostStatus>().is_err());
    }

    #[test]
    fn post_status_round_trips_through_wire_enum() {
        for status in PostStatus::ALL {
            let wire: PostStatusDto = status.into();
            assert_eq!(PostStatus::from(wire), status);
        }
    }
}
