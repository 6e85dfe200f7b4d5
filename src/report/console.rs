use chrono::NaiveTime;
use colored::*;
use itertools::Itertools;

use crate::domain::solution::SimulationReport;
use crate::domain::types::DeliveryStatus;
use crate::report::status::snapshot;
use crate::setup::store::PackageStore;

pub fn print_report(report: &SimulationReport) {
    println!("\n{}", "--- Delivery Summary ---".bold());
    for v in &report.vehicles {
        let end = v
            .end_time
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "Truck {} | start {} | end {} | {:>6.2} mi | {}/{} packages",
            v.id.to_string().cyan(),
            v.start_time.format("%H:%M:%S"),
            end,
            v.distance,
            v.packages.len(),
            v.capacity
        );
        println!("  route: {}", v.package_ids().iter().join(" -> "));
    }

    println!(
        "\nDelivered: {} / {}",
        report.delivered_count().to_string().green(),
        report.total_packages
    );
    if !report.assignment_failed.is_empty() {
        println!(
            "{} {}",
            "Assignment failed:".red(),
            report.assignment_failed.iter().join(", ")
        );
    }
    if !report.routing_failed.is_empty() {
        println!(
            "{} {}",
            "Routing failed:".red(),
            report.routing_failed.iter().join(", ")
        );
    }

    let late = report.late_packages();
    if !late.is_empty() {
        println!("{}", "Late deliveries:".yellow());
        for p in late {
            println!(
                "  package {} due {} delivered {}",
                p.id,
                p.deadline.map(|d| d.to_string()).unwrap_or_default(),
                p.delivered_at
                    .map(|d| d.format("%H:%M:%S").to_string())
                    .unwrap_or_default()
            );
        }
    }

    println!("Total miles: {}", format!("{:.2}", report.total_distance()).bold());
}

pub fn print_status(report: &SimulationReport, store: &PackageStore, at: NaiveTime) {
    println!("\n{}", format!("--- Package status at {at} ---").bold());
    for line in snapshot(report, store, at) {
        let status = match line.status {
            DeliveryStatus::Delivered => line.status.to_string().green(),
            DeliveryStatus::EnRoute => line.status.to_string().yellow(),
            DeliveryStatus::Pending => line.status.to_string().normal(),
        };
        let truck = line
            .vehicle_id
            .map(|id| format!("truck {id}"))
            .unwrap_or_else(|| "unassigned".to_string());
        let when = line
            .delivered_at
            .map(|d| format!(" at {}", d.format("%H:%M:%S")))
            .unwrap_or_default();
        println!("Package {:>3} | {:<10} | {}{}", line.package_id, truck, status, when);
    }
}
