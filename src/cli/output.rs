//! CLI output formatting utilities

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use crate::auth::{Claims, GuardDecision, RouteClass, RouteTable};

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

/// Print a warning message
pub fn warn(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}

/// Print an info message
pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}

fn class_color(class: RouteClass) -> Color {
    match class {
        RouteClass::Public => Color::Green,
        RouteClass::AuthOnly => Color::Yellow,
        RouteClass::Protected => Color::Red,
        RouteClass::Unmatched => Color::Grey,
    }
}

/// Print the route classification as a table
pub fn print_route_table(table: &RouteTable) {
    let mut out = Table::new();
    out.load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Pattern").fg(Color::Cyan),
            Cell::new("Class").fg(Color::Cyan),
        ]);

    for (class, pattern) in table.entries() {
        out.add_row(vec![
            Cell::new(pattern),
            Cell::new(class.to_string()).fg(class_color(class)),
        ]);
    }
    for prefix in table.excluded() {
        out.add_row(vec![
            Cell::new(prefix.as_str()),
            Cell::new("excluded").fg(Color::DarkGrey),
        ]);
    }

    println!("{out}");
    info(&format!(
        "Paths in no list are treated as: {:?}",
        table.unmatched()
    ));
}

/// Print a guard decision for one request
pub fn print_decision(path: &str, class: RouteClass, authenticated: bool, decision: &GuardDecision) {
    println!("  {} {}", "Path:".bold(), path);
    println!("  {} {}", "Class:".bold(), class);
    println!(
        "  {} {}",
        "Session:".bold(),
        if authenticated { "valid".green() } else { "none".red() }
    );
    match decision {
        GuardDecision::Allow => println!("  {} {}", "Result:".bold(), "allow".green()),
        GuardDecision::Redirect(location) => println!(
            "  {} {} {}",
            "Result:".bold(),
            "redirect".yellow(),
            location.cyan()
        ),
    }
}

/// Print decoded token claims
pub fn print_claims(claims: &Claims, now: i64) {
    let expires = chrono::DateTime::from_timestamp(claims.exp, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| claims.exp.to_string());

    println!("{}", "Token Claims".bold().underline());
    println!();
    println!("  {} {}", "Subject:".bold(), claims.sub.as_deref().unwrap_or("-"));
    println!("  {} {}", "Email:".bold(), claims.email.as_deref().unwrap_or("-"));
    println!("  {} {}", "Name:".bold(), claims.name.as_deref().unwrap_or("-"));
    println!("  {} {}", "Role:".bold(), claims.role.as_deref().unwrap_or("-"));
    println!("  {} {}", "Expires:".bold(), expires);

    let status = if claims.is_expired_at(now) {
        "expired".red()
    } else {
        format!("live ({}s left)", claims.exp - now).green()
    };
    println!("  {} {}", "Status:".bold(), status);
}
