//! Coupon command handlers.

use chrono::{DateTime, Utc};
use tabled::Tabled;

use openleague_core::{Coupon, CouponUsageRecord, Eligibility, NewCoupon, RedeemRequest};

use crate::cli::{CouponsArgs, CouponsCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;
use crate::session::Session;

use super::{Presentation, util};

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct CouponRow {
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Type")]
    coupon_type: String,
    #[tabled(rename = "Uses")]
    uses: String,
    #[tabled(rename = "Cap")]
    cap: String,
    #[tabled(rename = "Expires")]
    expires: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl CouponRow {
    fn new(c: &Coupon, now: DateTime<Utc>) -> Self {
        Self {
            code: c.code.to_string(),
            coupon_type: c.coupon_type.to_string(),
            uses: format!("{}/{}", c.uses_count, c.max_uses),
            cap: c.max_amount_per_use.map(|v| v.to_string()).unwrap_or_default(),
            expires: c.expires_at.map(|at| fmt_time(&at)).unwrap_or_default(),
            status: status_of(c, now).to_owned(),
        }
    }
}

#[derive(Tabled)]
struct UsageRow {
    #[tabled(rename = "Used At")]
    used_at: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Tx Hash")]
    tx_hash: String,
    #[tabled(rename = "IP")]
    ip: String,
}

impl From<&CouponUsageRecord> for UsageRow {
    fn from(r: &CouponUsageRecord) -> Self {
        Self {
            used_at: fmt_time(&r.used_at),
            amount: r.amount.map(|v| v.to_string()).unwrap_or_default(),
            tx_hash: r.tx_hash.clone().unwrap_or_default(),
            ip: r.ip_address.clone().unwrap_or_default(),
        }
    }
}

fn fmt_time(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

fn status_of(c: &Coupon, now: DateTime<Utc>) -> &'static str {
    if c.is_expired_at(now) {
        "expired"
    } else if c.is_exhausted() {
        "exhausted"
    } else {
        "active"
    }
}

fn coupon_detail(c: &Coupon, color: bool) -> String {
    let now = Utc::now();
    let mut lines = vec![
        format!("Code:        {}", c.code),
        format!("Type:        {}", c.coupon_type),
        format!(
            "Status:      {}",
            output::status(status_of(c, now), c.is_usable_at(now), color)
        ),
        format!(
            "Uses:        {}/{} ({} remaining)",
            c.uses_count,
            c.max_uses,
            c.remaining_uses()
        ),
        format!(
            "Cap:         {}",
            c.max_amount_per_use
                .map_or_else(|| "-".into(), |v| v.to_string())
        ),
        format!(
            "Expires:     {}",
            c.expires_at.map_or_else(|| "never".into(), |at| fmt_time(&at))
        ),
        format!("Created by:  {}", c.created_by),
        format!("Created at:  {}", fmt_time(&c.created_at)),
    ];
    if let Some(ref d) = c.description {
        lines.push(format!("Description: {d}"));
    }
    lines.join("\n")
}

fn eligibility_detail(e: &Eligibility) -> String {
    let mut lines = vec![
        format!("Code:        {}", e.code),
        format!("Type:        {}", e.coupon_type),
        format!("Remaining:   {}", e.remaining_uses),
    ];
    if let Some(cap) = e.max_amount_per_use {
        lines.push(format!("Cap:         {cap}"));
    }
    if let Some(at) = e.expires_at {
        lines.push(format!("Expires:     {}", fmt_time(&at)));
    }
    lines.join("\n")
}

fn record_detail(r: &CouponUsageRecord) -> String {
    let mut lines = vec![
        format!("Record:      {}", r.id),
        format!("Code:        {}", r.code),
        format!("Used at:     {}", fmt_time(&r.used_at)),
    ];
    if let Some(amount) = r.amount {
        lines.push(format!("Amount:      {amount}"));
    }
    if let Some(ref tx) = r.tx_hash {
        lines.push(format!("Tx hash:     {tx}"));
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    session: &Session,
    args: CouponsArgs,
    global: &GlobalOpts,
    view: &Presentation,
) -> Result<(), CliError> {
    let service = session.service();

    match args.command {
        CouponsCommand::Create {
            code,
            coupon_type,
            max_uses,
            max_amount,
            expires_at,
            description,
        } => {
            let actor = config::require_principal(global, "coupons create")?;

            let mut request = NewCoupon::new(coupon_type.into()).with_max_uses(max_uses);
            if let Some(code) = code {
                request = request.with_code(code);
            }
            if let Some(cap) = max_amount {
                request = request.with_max_amount_per_use(cap);
            }
            if let Some(raw) = expires_at {
                request = request.with_expires_at(util::parse_timestamp("expires_at", &raw)?);
            }
            if let Some(d) = description {
                request = request.with_description(d);
            }

            let coupon = service.create_coupon(&actor, request)?;
            let out = output::render_single(
                view.format,
                &coupon,
                |c| coupon_detail(c, view.color),
                |c| c.code.to_string(),
            )?;
            output::print_output(&out, view.quiet);
            output::notice(
                &format!("Created coupon {} in {}", coupon.code, session.data_file().display()),
                view.quiet,
                view.color,
            );
            Ok(())
        }

        CouponsCommand::List { usable } => {
            let now = Utc::now();
            let mut coupons = service.coupons()?;
            if usable {
                coupons.retain(|c| c.is_usable_at(now));
            }
            let out = output::render_list(
                view.format,
                &coupons,
                |c| CouponRow::new(c, now),
                |c| c.code.to_string(),
            )?;
            output::print_output(&out, view.quiet);
            Ok(())
        }

        CouponsCommand::Get { code } => {
            let coupon = service.coupon(&code)?;
            let out = output::render_single(
                view.format,
                &coupon,
                |c| coupon_detail(c, view.color),
                |c| c.code.to_string(),
            )?;
            output::print_output(&out, view.quiet);
            Ok(())
        }

        CouponsCommand::Validate { code } => {
            let eligibility = service.validate_code(&code)?;
            let out = output::render_single(view.format, &eligibility, eligibility_detail, |e| {
                e.remaining_uses.to_string()
            })?;
            output::print_output(&out, view.quiet);
            Ok(())
        }

        CouponsCommand::Redeem {
            code,
            amount,
            tx_hash,
            metadata,
            ip,
        } => {
            let actor = config::require_principal(global, "coupons redeem")?;
            let mut request = RedeemRequest::new(code);
            if let Some(amount) = amount {
                request = request.with_amount(amount);
            }
            if let Some(tx) = tx_hash {
                request = request.with_tx_hash(tx);
            }
            if let Some(raw) = metadata {
                request = request.with_metadata(util::parse_metadata(&raw)?);
            }
            if let Some(ip) = ip {
                request = request.with_ip_address(ip);
            }

            let record = service.redeem(&actor, request).await?;
            let out = output::render_single(view.format, &record, record_detail, |r| {
                r.id.to_string()
            })?;
            output::print_output(&out, view.quiet);

            let remaining = service.coupon(record.code.as_str())?.remaining_uses();
            output::notice(
                &format!("Redeemed {} ({remaining} uses left)", record.code),
                view.quiet,
                view.color,
            );
            Ok(())
        }

        CouponsCommand::Expire { code } => {
            let actor = config::require_principal(global, "coupons expire")?;
            if !util::confirm(
                &format!("Expire coupon {code}? It cannot be redeemed afterwards."),
                "coupons expire",
                view.yes,
            )? {
                eprintln!("Aborted.");
                return Ok(());
            }

            let coupon = service.expire_coupon(&actor, &code)?;
            let out = output::render_single(
                view.format,
                &coupon,
                |c| coupon_detail(c, view.color),
                |c| c.code.to_string(),
            )?;
            output::print_output(&out, view.quiet);
            output::notice(&format!("Expired {}", coupon.code), view.quiet, view.color);
            Ok(())
        }

        CouponsCommand::Usage { code } => {
            let actor = config::require_principal(global, "coupons usage")?;
            let records = service.usage(&actor, &code)?;
            let out = output::render_list(view.format, &records, |r| UsageRow::from(r), |r| {
                r.id.to_string()
            })?;
            output::print_output(&out, view.quiet);
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;
    use openleague_core::{CouponCode, CouponType, PrincipalId};

    fn coupon(uses: u32, max: u32, expires_in: Option<Duration>) -> Coupon {
        let now = Utc::now();
        Coupon {
            id: uuid::Uuid::nil(),
            code: CouponCode::new("GAS-1"),
            coupon_type: CouponType::GasSponsorship,
            max_uses: max,
            uses_count: uses,
            max_amount_per_use: Some(100),
            expires_at: expires_in.map(|d| now + d),
            description: None,
            created_by: PrincipalId::new("admin"),
            created_at: now,
            version: 0,
        }
    }

    #[test]
    fn status_prefers_expired() {
        let now = Utc::now();
        assert_eq!(status_of(&coupon(0, 2, None), now), "active");
        assert_eq!(status_of(&coupon(2, 2, None), now), "exhausted");
        assert_eq!(
            status_of(&coupon(2, 2, Some(Duration::seconds(-5))), now),
            "expired"
        );
    }

    #[test]
    fn row_shows_usage_fraction() {
        let row = CouponRow::new(&coupon(1, 2, None), Utc::now());
        assert_eq!(row.uses, "1/2");
        assert_eq!(row.cap, "100");
        assert_eq!(row.status, "active");
    }
}
