//! Access decision handler.

use serde::Serialize;

use openleague_core::{Decision, Principal, PrincipalId, Role, authorize};

use crate::cli::{AccessArgs, AccessCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::Presentation;

#[derive(Debug, Serialize)]
struct AccessReport {
    principal: Principal,
    #[serde(skip_serializing_if = "Option::is_none")]
    owner: Option<PrincipalId>,
    required_roles: Vec<Role>,
    #[serde(flatten)]
    decision: Decision,
}

fn detail(r: &AccessReport, color: bool) -> String {
    let verdict = match r.decision {
        Decision::Allow(reason) => output::status(&format!("ALLOW ({reason})"), true, color),
        Decision::Deny(reason) => output::status(&format!("DENY ({reason})"), false, color),
    };
    let roles = r
        .required_roles
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    [
        format!("Principal:   {} ({})", r.principal.id, r.principal.role),
        format!("Super admin: {}", r.principal.is_super_admin),
        format!(
            "Owner:       {}",
            r.owner.as_ref().map_or_else(|| "-".into(), ToString::to_string)
        ),
        format!("Requires:    {}", if roles.is_empty() { "-" } else { roles.as_str() }),
        format!("Decision:    {verdict}"),
    ]
    .join("\n")
}

pub fn handle(args: AccessArgs, global: &GlobalOpts, view: &Presentation) -> Result<(), CliError> {
    match args.command {
        AccessCommand::Check { owner, required } => {
            let principal = config::require_principal(global, "access check")?;
            let owner = owner.map(PrincipalId::new);
            let required_roles: Vec<Role> = required.into_iter().map(Role::from).collect();

            let decision = authorize(&principal, owner.as_ref(), &required_roles);
            let report = AccessReport {
                principal,
                owner,
                required_roles,
                decision,
            };

            let out = output::render_single(
                view.format,
                &report,
                |r| detail(r, view.color),
                |r| {
                    if r.decision.is_allowed() {
                        "allow".into()
                    } else {
                        "deny".into()
                    }
                },
            )?;
            output::print_output(&out, view.quiet);

            decision.into_result("act on this resource")?;
            Ok(())
        }
    }
}
