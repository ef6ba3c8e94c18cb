//! `casting roles` - print the role → permission table.

use casting_core::{Permission, RolePreset};

/// Render the table, one row per permission, one column per role.
pub fn render() -> String {
    let mut out = format!("{:<16}", "permission");
    for role in RolePreset::ALL {
        out.push_str(&format!("{:<12}", role.name()));
    }
    out.push('\n');

    for permission in Permission::ALL {
        out.push_str(&format!("{:<16}", permission.as_str()));
        for role in RolePreset::ALL {
            let mark = if role.grants(permission) { "x" } else { "-" };
            out.push_str(&format!("{mark:<12}"));
        }
        out.push('\n');
    }
    out
}

/// JSON form: `{"assistant": ["get:movies", ...], ...}`.
pub fn render_json() -> serde_json::Value {
    RolePreset::ALL
        .into_iter()
        .map(|role| {
            (
                role.name().to_string(),
                serde_json::json!(role.permission_strings()),
            )
        })
        .collect::<serde_json::Map<_, _>>()
        .into()
}
