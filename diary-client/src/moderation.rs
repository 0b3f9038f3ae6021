use crate::models::{Diary, DiaryStatus};
use crate::validation::ValidationError;
use std::fmt;
use std::str::FromStr;

/// Reason attached when an administrator withdraws an approval.
pub const REVOKE_REASON: &str = "Approval revoked by administrator";

/// Dashboard status filter; `All` sends no `status` parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(DiaryStatus),
}

impl StatusFilter {
    pub const OPTIONS: [StatusFilter; 4] = [
        StatusFilter::All,
        StatusFilter::Only(DiaryStatus::Pending),
        StatusFilter::Only(DiaryStatus::Approved),
        StatusFilter::Only(DiaryStatus::Rejected),
    ];

    pub fn query_value(&self) -> Option<&'static str> {
        match self {
            Self::All => None,
            Self::Only(status) => Some(status.as_str()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.query_value().unwrap_or("all")
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::All => "All statuses",
            Self::Only(status) => status.label(),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse().map(Self::Only)
    }
}

/// What an administrator can do to one row of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModerationAction {
    Approve,
    Reject,
    Revoke,
    ReReview,
    Delete,
}

impl ModerationAction {
    /// Actions offered for a diary in `status`, in display order.
    pub fn available_for(status: DiaryStatus) -> &'static [ModerationAction] {
        match status {
            DiaryStatus::Pending => &[Self::Approve, Self::Reject, Self::Delete],
            DiaryStatus::Approved => &[Self::Revoke, Self::Delete],
            DiaryStatus::Rejected => &[Self::ReReview, Self::Delete],
        }
    }

    pub fn is_available_for(self, status: DiaryStatus) -> bool {
        Self::available_for(status).contains(&self)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Approve => "Approve",
            Self::Reject => "Reject",
            Self::Revoke => "Revoke approval",
            Self::ReReview => "Re-review",
            Self::Delete => "Delete",
        }
    }

    pub fn confirmation_prompt(&self) -> &'static str {
        match self {
            Self::Approve | Self::ReReview => "Approve this diary?",
            Self::Reject | Self::Revoke => "Reject this diary?",
            Self::Delete => {
                "Delete this diary? The author will be notified and the diary soft-deleted."
            }
        }
    }

    pub fn success_message(&self) -> &'static str {
        match self {
            Self::Approve | Self::ReReview => "Diary approved.",
            Self::Reject | Self::Revoke => "Diary rejected.",
            Self::Delete => "Diary deleted.",
        }
    }

    /// The trimmed reason this action sends. Rejecting needs one, which can
    /// be checked before the diary's status is known.
    pub fn checked_reason(self, reason: Option<&str>) -> Result<Option<String>, ValidationError> {
        let reason = reason.map(str::trim).filter(|r| !r.is_empty());
        match (self, reason) {
            (Self::Reject, None) => Err(ValidationError::MissingRejectReason),
            (Self::Reject, Some(reason)) => Ok(Some(reason.to_string())),
            _ => Ok(None),
        }
    }

    /// Resolves the backend call for this action on a diary in `status`.
    ///
    /// Revoke and re-review reuse the reject and approve endpoints. A
    /// reason is mandatory only when rejecting a pending diary.
    pub fn prepare(
        self,
        status: DiaryStatus,
        reason: Option<&str>,
    ) -> Result<ModerationCall, ValidationError> {
        if !self.is_available_for(status) {
            return Err(ValidationError::ActionUnavailable { status });
        }

        let call = match self {
            Self::Approve | Self::ReReview => ModerationCall::Approve,
            Self::Reject => ModerationCall::Reject {
                reason: self.checked_reason(reason)?,
            },
            Self::Revoke => ModerationCall::Reject {
                reason: Some(REVOKE_REASON.to_string()),
            },
            Self::Delete => ModerationCall::Delete,
        };

        Ok(call)
    }
}

impl fmt::Display for ModerationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A concrete admin endpoint call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModerationCall {
    Approve,
    Reject { reason: Option<String> },
    Delete,
}

impl ModerationCall {
    /// Path segment appended to `/api/admin/diaries/{id}/`.
    pub fn path_segment(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject { .. } => "reject",
            Self::Delete => "delete",
        }
    }
}

/// Edit is shown only to the owner of a diary that is not approved yet.
pub fn can_edit(diary: &Diary, viewer_id: Option<&str>) -> bool {
    match viewer_id {
        Some(viewer) => diary.is_owned_by(viewer) && diary.status.is_editable(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn diary(status: DiaryStatus, author_id: &str) -> Diary {
        Diary {
            id: "d1".into(),
            title: "t".into(),
            content: "c".into(),
            images: vec![],
            video_url: None,
            author: None,
            author_id: Some(author_id.into()),
            created_at: Utc::now(),
            status,
            reject_reason: None,
        }
    }

    #[test]
    fn actions_depend_on_status() {
        assert_eq!(
            ModerationAction::available_for(DiaryStatus::Pending),
            &[
                ModerationAction::Approve,
                ModerationAction::Reject,
                ModerationAction::Delete
            ]
        );
        assert!(ModerationAction::Revoke.is_available_for(DiaryStatus::Approved));
        assert!(!ModerationAction::Revoke.is_available_for(DiaryStatus::Pending));
        assert!(ModerationAction::ReReview.is_available_for(DiaryStatus::Rejected));
        assert!(ModerationAction::Delete.is_available_for(DiaryStatus::Rejected));
    }

    #[test]
    fn rejecting_pending_requires_reason() {
        assert_eq!(
            ModerationAction::Reject.prepare(DiaryStatus::Pending, Some("   ")),
            Err(ValidationError::MissingRejectReason)
        );
        assert_eq!(
            ModerationAction::Reject.prepare(DiaryStatus::Pending, Some(" blurry ")),
            Ok(ModerationCall::Reject {
                reason: Some("blurry".into())
            })
        );
    }

    #[test]
    fn reject_reason_is_checked_without_status() {
        assert_eq!(
            ModerationAction::Reject.checked_reason(None),
            Err(ValidationError::MissingRejectReason)
        );
        assert_eq!(
            ModerationAction::Reject.checked_reason(Some(" out of focus ")),
            Ok(Some("out of focus".into()))
        );
        assert_eq!(ModerationAction::Approve.checked_reason(Some("ignored")), Ok(None));
    }

    #[test]
    fn revoke_uses_fixed_reason_and_rereview_approves() {
        assert_eq!(
            ModerationAction::Revoke.prepare(DiaryStatus::Approved, None),
            Ok(ModerationCall::Reject {
                reason: Some(REVOKE_REASON.into())
            })
        );
        assert_eq!(
            ModerationAction::ReReview.prepare(DiaryStatus::Rejected, None),
            Ok(ModerationCall::Approve)
        );
    }

    #[test]
    fn unavailable_action_is_refused() {
        assert_eq!(
            ModerationAction::Approve.prepare(DiaryStatus::Approved, None),
            Err(ValidationError::ActionUnavailable {
                status: DiaryStatus::Approved
            })
        );
    }

    #[test]
    fn status_filter_parses_all() {
        assert_eq!("all".parse::<StatusFilter>(), Ok(StatusFilter::All));
        assert_eq!(
            "Rejected".parse::<StatusFilter>(),
            Ok(StatusFilter::Only(DiaryStatus::Rejected))
        );
        assert!("archived".parse::<StatusFilter>().is_err());
        assert_eq!(StatusFilter::All.query_value(), None);
    }

    #[test]
    fn edit_visible_only_to_owner_before_approval() {
        assert!(can_edit(&diary(DiaryStatus::Pending, "u1"), Some("u1")));
        assert!(can_edit(&diary(DiaryStatus::Rejected, "u1"), Some("u1")));
        assert!(!can_edit(&diary(DiaryStatus::Approved, "u1"), Some("u1")));
        assert!(!can_edit(&diary(DiaryStatus::Pending, "u1"), Some("u2")));
        assert!(!can_edit(&diary(DiaryStatus::Pending, "u1"), None));
    }
}
