//! Participant records from the users API and their marker nodes

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::nodes::{MarkerCategory, NodeId, NodeList};

/// Marker weight given to every participant
pub const USER_WEIGHT: f64 = 5.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UserNode {
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub x_account: Option<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub highlights: Option<Vec<String>>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub anonymous: bool,
    #[serde(default)]
    pub skills: Option<Vec<String>>,
    #[serde(default)]
    pub interests: Option<Vec<String>>,
    #[serde(default)]
    pub team_status: Option<String>,
}

impl UserNode {
    /// Identity key: e-mail when present, else name, location and coordinates.
    ///
    /// Only records that agree on all of those collapse into one marker.
    pub fn key(&self) -> String {
        let email = self.email.trim();
        if !email.is_empty() {
            return email.to_string();
        }
        match self.coordinates {
            Some(c) => format!("{}|{}|{:.5},{:.5}", self.name, self.location, c.latitude, c.longitude),
            None => format!("{}|{}", self.name, self.location),
        }
    }

    pub fn node_id(&self) -> NodeId {
        NodeId::from_key(&self.key())
    }

    /// Name shown in the UI; anonymous participants stay anonymous
    pub fn display_name(&self) -> &str {
        if self.anonymous {
            "Anonymous builder"
        } else {
            &self.name
        }
    }

    pub fn twitter_handle(&self) -> Option<&str> {
        self.x_account.as_deref().and_then(last_path_segment)
    }

    pub fn linkedin_handle(&self) -> Option<&str> {
        self.linkedin_url
            .as_deref()
            .map(|url| url.split('?').next().unwrap_or(url))
            .and_then(last_path_segment)
    }
}

/// Last non-empty path segment of a profile URL (or the input itself)
fn last_path_segment(url: &str) -> Option<&str> {
    url.trim_end_matches('/')
        .rsplit('/')
        .find(|part| !part.is_empty())
        .map(|handle| handle.trim_start_matches('@'))
        .filter(|handle| !handle.is_empty())
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct UsersResponse {
    pub users: Vec<UserNode>,
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub message: Option<String>,
}

/// Decode a users response. Malformed bodies degrade to an empty list.
pub fn parse_users(body: &str) -> Vec<UserNode> {
    match serde_json::from_str::<UsersResponse>(body) {
        Ok(response) => {
            if let Some(message) = response.message.as_deref() {
                tracing::debug!(message, total = response.total, "Users response message");
            }
            response.users
        }
        Err(e) => {
            warn!(error = %e, "Could not decode users response");
            Vec::new()
        }
    }
}

/// Marker nodes for every user with coordinates.
///
/// Users missing from `previous` are flagged new so the view can pulse them.
/// On the first load (`previous` empty) nothing is new.
pub fn build_user_nodes(users: &[UserNode], previous: &NodeList<UserNode>) -> NodeList<UserNode> {
    let known: HashSet<NodeId> = previous.iter().map(|n| n.id).collect();
    let mut builder = NodeList::builder();
    for user in users {
        let Some(coords) = user.coordinates else {
            continue;
        };
        let pushed = builder.push(
            &user.key(),
            coords.longitude,
            coords.latitude,
            USER_WEIGHT,
            MarkerCategory::User,
            user.clone(),
        );
        if matches!(pushed, Some(id) if !known.is_empty() && !known.contains(&id)) {
            builder.mark_last_new();
        }
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "users": [
            {"name": "Ada", "email": "ada@example.org", "location": "London",
             "coordinates": {"latitude": 51.5, "longitude": -0.12},
             "x_account": "https://x.com/ada", "anonymous": false,
             "skills": ["rust"]},
            {"name": "Grace", "email": "", "location": "Arlington", "anonymous": true,
             "coordinates": {"latitude": 38.9, "longitude": -77.1},
             "linkedin_url": "https://www.linkedin.com/in/grace/?trk=x"},
            {"name": "Nowhere", "email": "nowhere@example.org", "location": "", "anonymous": false}
        ],
        "total": 3
    }"#;

    #[test]
    fn test_parse_users() {
        let users = parse_users(BODY);
        assert_eq!(users.len(), 3);
        assert_eq!(users[0].skills.as_deref(), Some(&["rust".to_string()][..]));
        assert!(users[2].coordinates.is_none());
    }

    #[test]
    fn test_parse_failure_is_empty() {
        assert!(parse_users("Internal Server Error").is_empty());
        assert!(parse_users(r#"{"total": 3}"#).is_empty());
    }

    #[test]
    fn test_nodes_skip_users_without_coordinates() {
        let users = parse_users(BODY);
        let nodes = build_user_nodes(&users, &NodeList::default());
        assert_eq!(nodes.len(), 2);
        assert!(nodes.iter().all(|n| n.weight == USER_WEIGHT && !n.is_new));
        // empty e-mail falls back to name, location and coordinates
        assert_eq!(
            nodes.as_slice()[1].id,
            NodeId::from_key("Grace|Arlington|38.90000,-77.10000")
        );
        assert_eq!(nodes.as_slice()[1].id, users[1].node_id());
    }

    fn nameless_user(name: &str, latitude: f64, longitude: f64) -> UserNode {
        UserNode {
            name: name.to_string(),
            location: "Somewhere".to_string(),
            coordinates: Some(Coordinates { latitude, longitude }),
            ..UserNode::default()
        }
    }

    #[test]
    fn test_same_name_without_email_keeps_both() {
        let users = vec![nameless_user("Alex", 52.5, 13.4), nameless_user("Alex", 40.7, -74.0)];
        let nodes = build_user_nodes(&users, &NodeList::default());
        assert_eq!(nodes.len(), users.len());
        assert_ne!(users[0].node_id(), users[1].node_id());
    }

    #[test]
    fn test_identical_records_collapse() {
        let users = vec![nameless_user("Alex", 52.5, 13.4), nameless_user("Alex", 52.5, 13.4)];
        let nodes = build_user_nodes(&users, &NodeList::default());
        assert_eq!(nodes.len(), 1);
    }

    #[test]
    fn test_new_users_flagged_on_refresh() {
        let users = parse_users(BODY);
        let first = build_user_nodes(&users[..1], &NodeList::default());
        let second = build_user_nodes(&users, &first);
        let flags: Vec<bool> = second.iter().map(|n| n.is_new).collect();
        assert_eq!(flags, vec![false, true]);
    }

    #[test]
    fn test_handles() {
        let users = parse_users(BODY);
        assert_eq!(users[0].twitter_handle(), Some("ada"));
        assert_eq!(users[1].linkedin_handle(), Some("grace"));
        assert_eq!(users[1].display_name(), "Anonymous builder");
        assert_eq!(users[2].twitter_handle(), None);
    }
}
