use serde::Deserialize;

/// One guild member from the roster snapshot.
///
/// `user_id` is the platform-assigned stable identifier; every display field
/// other than the primary handle may be absent. Members are read-only once
/// fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterMember {
    pub user_id: String,
    pub username: String,
    pub global_name: Option<String>,
    pub nick: Option<String>,
}

impl RosterMember {
    /// Display name with the precedence Discord clients apply: server
    /// nickname, then global display name, then the primary handle.
    pub fn display_name(&self) -> &str {
        self.nick
            .as_deref()
            .or(self.global_name.as_deref())
            .unwrap_or(&self.username)
    }

    /// Alias candidates in index precedence order. Later candidates overwrite
    /// earlier ones when they normalize to the same key.
    pub fn alias_candidates(&self) -> [Option<&str>; 4] {
        [
            Some(self.username.as_str()),
            self.global_name.as_deref(),
            Some(self.display_name()),
            self.nick.as_deref(),
        ]
    }
}

/// One guild the bot has joined, as reported by `GET /users/@me/guilds`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GuildSummary {
    pub id: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::RosterMember;

    fn member(
        user_id: &str,
        username: &str,
        global_name: Option<&str>,
        nick: Option<&str>,
    ) -> RosterMember {
        RosterMember {
            user_id: user_id.to_string(),
            username: username.to_string(),
            global_name: global_name.map(str::to_string),
            nick: nick.map(str::to_string),
        }
    }

    #[test]
    fn unit_display_name_prefers_nick_then_global_name_then_username() {
        assert_eq!(
            member("1", "alice", Some("Alice"), Some("Ally")).display_name(),
            "Ally"
        );
        assert_eq!(
            member("1", "alice", Some("Alice"), None).display_name(),
            "Alice"
        );
        assert_eq!(member("1", "alice", None, None).display_name(), "alice");
    }

    #[test]
    fn unit_alias_candidates_keep_fixed_order() {
        let entry = member("2", "bob", Some("Robert"), Some("Bobby"));
        assert_eq!(
            entry.alias_candidates(),
            [Some("bob"), Some("Robert"), Some("Bobby"), Some("Bobby")]
        );
    }
}
