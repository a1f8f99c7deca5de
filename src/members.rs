use crate::authentik::{AuthentikUser, GroupApi};
use crate::config::Settings;
use crate::error::{SyncError, SyncResult};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct MembershipResolver {
    settings: Settings,
    client: Arc<dyn GroupApi>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedMember {
    pub username: String,
    pub email: String,
}

/// Outcome of resolving one group: the members that resolved, in the order
/// the provider returned them, and the ones that did not.
#[derive(Debug, Default)]
pub struct GroupResolution {
    pub members: Vec<ResolvedMember>,
    pub skipped: Vec<SkippedMember>,
}

#[derive(Debug)]
pub struct SkippedMember {
    pub username: String,
    pub email: String,
    pub reason: SyncError,
}

impl MembershipResolver {
    pub fn new(settings: Settings, client: Arc<dyn GroupApi>) -> Self {
        Self { settings, client }
    }

    /// Resolves the group and returns only the members that resolved, logging
    /// one warning per skipped member.
    pub async fn group_members(&self, group_name: &str) -> SyncResult<Vec<ResolvedMember>> {
        let outcome = self.resolve_group(group_name).await?;

        for skip in &outcome.skipped {
            warn!(
                username = %skip.username,
                email = %skip.email,
                reason = %skip.reason,
                "Skipping unresolvable group member"
            );
        }

        Ok(outcome.members)
    }

    /// One provider call, then a fold over the embedded member list.
    /// Member-scoped failures land in `skipped`; the batch always completes.
    pub async fn resolve_group(&self, group_name: &str) -> SyncResult<GroupResolution> {
        let list = self.client.list_groups(group_name).await?;

        if list.pagination.count == 0 {
            return Err(SyncError::GroupNotFound(group_name.to_string()));
        }

        // Multiple groups can share a name; the first match wins with no
        // tie-break, matching upstream behavior.
        if list.results.len() > 1 {
            debug!(
                group = group_name,
                matches = list.results.len(),
                "Multiple groups matched, using the first"
            );
        }
        let group = list
            .results
            .into_iter()
            .next()
            .ok_or_else(|| SyncError::GroupNotFound(group_name.to_string()))?;

        debug!(
            group = %group.name,
            pk = %group.pk,
            members = group.users_obj.len(),
            "Resolving group members"
        );

        let mut outcome = GroupResolution::default();
        for user in &group.users_obj {
            match self.resolve_username(user) {
                Ok(username) => outcome.members.push(ResolvedMember {
                    username,
                    email: user.email.clone(),
                }),
                Err(reason) => outcome.skipped.push(SkippedMember {
                    username: user.username.clone(),
                    email: user.email.clone(),
                    reason,
                }),
            }
        }

        Ok(outcome)
    }

    fn resolve_username(&self, user: &AuthentikUser) -> SyncResult<String> {
        match self.settings.username_attribute.as_deref() {
            // Attribute mode never falls back to the native username.
            Some(path) => attribute_username(&user.attributes, path),
            None => {
                if user.username.is_empty() {
                    return Err(SyncError::MissingUsername);
                }
                Ok(match &self.settings.emu_shortcode {
                    Some(shortcode) => format!("{}_{}", user.username, shortcode),
                    None => user.username.clone(),
                })
            }
        }
    }
}

/// Walks a dot-delimited path through the user's nested attribute map. The
/// terminal value must be a non-empty string.
fn attribute_username(attributes: &Map<String, Value>, path: &str) -> SyncResult<String> {
    let mut current: Option<&Value> = None;
    for segment in path.split('.') {
        current = match current {
            None => attributes.get(segment),
            Some(value) => value.as_object().and_then(|map| map.get(segment)),
        };
        if current.is_none() {
            return Err(SyncError::AttributeResolution(format!(
                "no value at attribute path {path}"
            )));
        }
    }

    match current.and_then(Value::as_str) {
        Some(username) if !username.is_empty() => Ok(username.to_string()),
        _ => Err(SyncError::AttributeResolution(format!(
            "attribute path {path} does not hold a usable username"
        ))),
    }
}
