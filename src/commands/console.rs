use crate::*;
use std::fmt::Display;

/// Fetch one view's data through a loader; a failed fetch becomes the
/// view's generic failure message.
fn load_view<T: Clone, E: Display>(
    view: &'static str,
    fetch: impl FnOnce() -> Result<T, E>,
) -> anyhow::Result<T> {
    let loader = ResourceLoader::new(view);
    loader.load(|_| fetch());
    match loader.state() {
        LoadState::Success(value) => Ok(value),
        LoadState::Loading | LoadState::Error => anyhow::bail!(loader.failure_message()),
    }
}

fn view_name(command: &Commands) -> Option<&'static str> {
    Some(match command {
        Commands::Dashboard { .. } => "dashboard",
        Commands::History => "history",
        Commands::Risk => "risk",
        Commands::Violations { .. } => "violations",
        Commands::Scan { .. } => "scan",
        Commands::System { .. } => "system",
        Commands::Report { .. } => "report",
        _ => return None,
    })
}

fn dashboard_lines(d: &DashboardSummary) -> String {
    let mut lines = vec![
        format!("total_rules_triggered: {}", d.total_rules_triggered),
        format!("total_violations: {}", d.total_violations),
        format!("total_risk_score: {}", d.total_risk_score),
        format!("average_risk: {:.2}", d.average_risk),
        format!("system_status: {}", d.system_status),
    ];
    if let Some(t) = &d.top_risky_table {
        lines.push(format!("top_risky_table: {} ({})", t.table_name, t.total_risk));
    }
    lines.join("\n")
}

fn risk_lines(r: &RiskSummary) -> String {
    let mut lines = vec![
        format!("system_status: {}", r.system_status),
        format!("total_violations: {}", r.overview.total_violations),
        format!("total_risk_score: {}", r.overview.total_risk_score),
        format!("average_risk: {:.2}", r.overview.average_risk),
        format!("max_risk: {}", r.overview.max_risk),
        format!("min_risk: {}", r.overview.min_risk),
        format!("high_risk_percentage: {:.2}", r.high_risk_percentage),
    ];
    for (severity, count) in &r.distribution {
        lines.push(format!("distribution.{severity}: {count}"));
    }
    for rule in &r.top_risky_rules {
        let id = rule
            .rule_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        lines.push(format!("rule {id}\t{}", rule.total_risk));
    }
    lines.join("\n")
}

pub fn scan_result_lines(r: &ScanResult) -> String {
    [
        format!("status: {}", r.status),
        format!("scan_id: {}", r.scan_id),
        format!("total_rules: {}", r.total_rules),
        format!("violations_found: {}", r.violations_found),
        format!("scan_mode: {}", r.scan_mode),
    ]
    .join("\n")
}

fn violation_row(v: &Violation) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}\t{}",
        v.id, v.status, v.severity, v.table_name, v.record_id, v.message
    )
}

fn history_row(r: &ScanRecord) -> String {
    let count = |v: Option<i64>| v.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string());
    format!(
        "{}\t{}\t{}\t{}\t{}",
        r.id,
        r.scanned_at,
        r.status,
        count(r.total_violations),
        count(r.total_risk_score)
    )
}

fn config_lines(v: &ConfigView) -> String {
    let mut lines = vec![
        format!("state: {}", v.state),
        format!("auto_scan_enabled: {}", v.auto_scan_enabled),
        format!("scan_interval_minutes: {}", v.scan_interval_minutes),
    ];
    if let Some(r) = &v.rejected_draft {
        lines.push(format!(
            "rejected: auto_scan_enabled={} scan_interval_minutes={}",
            r.auto_scan_enabled, r.scan_interval_minutes
        ));
    }
    if let Some(m) = &v.message {
        lines.push(m.clone());
    }
    lines.join("\n")
}

pub fn handle_console_commands(cli: &Cli, ctx: &Context) -> anyhow::Result<Dispatch> {
    let Some(view) = view_name(&cli.command) else {
        return Ok(Dispatch::Unhandled);
    };
    let session = match SessionGuard::new(&ctx.store).enter(view) {
        GuardDecision::Proceed(session) => session,
        GuardDecision::RedirectToLogin => {
            print_redirect(cli.json)?;
            return Ok(Dispatch::LoginRedirect);
        }
    };
    let api = HttpApi::new(&ctx.settings, &session)?;

    match &cli.command {
        Commands::Dashboard { scan_id } => {
            let summary = load_view("dashboard", || api.dashboard(*scan_id))?;
            print_one(cli.json, summary, dashboard_lines)?;
        }
        Commands::History => {
            let records = load_view("history", || api.history())?;
            print_list(cli.json, &records, "No scan history found.", history_row)?;
        }
        Commands::Risk => {
            let risk = load_view("risk", || api.risk())?;
            print_one(cli.json, risk, risk_lines)?;
        }
        Commands::Violations { command } => {
            handle_violations(cli, ctx, &api, command)?;
        }
        Commands::Scan {
            policy,
            db_uri,
            data_file,
            exclusive,
        } => {
            let exclusivity = if *exclusive {
                SourceExclusivity::Reject
            } else {
                ctx.settings.scan.source_exclusivity
            };
            let form = ScanForm {
                policy_file: policy.clone(),
                database_uri: db_uri.clone(),
                dataset_file: data_file.clone(),
            };
            let controller = ScanSubmissionController::new(&api, exclusivity);
            controller.submit(&form)?;
            let ScanOutcome::Completed(result) = controller.outcome() else {
                anyhow::bail!("Scan failed");
            };
            audit(
                "scan.submit",
                serde_json::json!({ "scan_id": result.scan_id, "scan_mode": result.scan_mode }),
            );
            print_one(cli.json, result, scan_result_lines)?;
        }
        Commands::System { command } => {
            let editor = ConfigEditor::new(&api);
            editor.load();
            if editor.state().is_none() {
                anyhow::bail!(editor.failure_message());
            }
            if let SystemCommands::Set {
                auto_scan,
                interval,
            } = command
            {
                editor.edit(*auto_scan, *interval)?;
                match editor.save() {
                    Ok(Some(saved)) => audit("system.update", serde_json::to_value(saved)?),
                    Ok(None) => {}
                    Err(err @ SaveError::Transport { .. }) => {
                        // show the reverted values and the rejected draft before failing
                        if let Some(view) = editor.view() {
                            print_one(cli.json, view, config_lines)?;
                        }
                        return Err(err.into());
                    }
                    Err(err) => return Err(err.into()),
                }
            }
            let view = editor
                .view()
                .ok_or_else(|| anyhow::anyhow!(editor.failure_message()))?;
            print_one(cli.json, view, config_lines)?;
        }
        Commands::Report { scan_id, out } => {
            let bytes = api
                .report(*scan_id)
                .map_err(|e| anyhow::anyhow!(failure_message(&e, "Failed to generate report")))?;
            write_report(out, &bytes)?;
            audit(
                "report.download",
                serde_json::json!({ "scan_id": scan_id, "path": out.display().to_string() }),
            );
            let report = ReportOut {
                path: out.display().to_string(),
                bytes: bytes.len(),
                scan_id: *scan_id,
            };
            print_one(cli.json, report, |r| {
                format!("wrote {} bytes to {}", r.bytes, r.path)
            })?;
        }
        _ => return Ok(Dispatch::Unhandled),
    }
    Ok(Dispatch::Done)
}

fn handle_violations(
    cli: &Cli,
    ctx: &Context,
    api: &HttpApi,
    command: &ViolationCommands,
) -> anyhow::Result<()> {
    match command {
        ViolationCommands::List { status, limit } => {
            let workflow =
                ViolationWorkflow::new(api, limit.unwrap_or(ctx.settings.violations_limit));
            workflow.set_filter(*status);
            workflow.refresh();
            if workflow.state() == LoadState::Error {
                anyhow::bail!(workflow.failure_message());
            }
            let visible = workflow.visible();
            let listing = ViolationListView {
                filter: status.as_str().to_string(),
                fetched: workflow.fetched().len(),
                empty: visible.is_empty(),
                violations: visible,
            };
            print_one(cli.json, listing, |l| {
                if l.empty {
                    "No violations found.".to_string()
                } else {
                    l.violations
                        .iter()
                        .map(violation_row)
                        .collect::<Vec<_>>()
                        .join("\n")
                }
            })?;
        }
        ViolationCommands::Resolve { ids, limit } => {
            let workflow =
                ViolationWorkflow::new(api, limit.unwrap_or(ctx.settings.violations_limit));
            workflow.refresh();
            if workflow.state() == LoadState::Error {
                anyhow::bail!(workflow.failure_message());
            }

            let reports: Vec<ResolveReport> = workflow
                .resolve_many(ids)
                .into_iter()
                .map(|(id, outcome)| match outcome {
                    Ok(()) => {
                        audit("violation.resolve", serde_json::json!({ "id": id }));
                        ResolveReport {
                            id,
                            status: "resolved".to_string(),
                            detail: None,
                        }
                    }
                    Err(ResolveError::Transport { source, .. }) => ResolveReport {
                        id,
                        status: "failed".to_string(),
                        detail: Some(failure_message(&source, "Failed to resolve violation")),
                    },
                    Err(other) => ResolveReport {
                        id,
                        status: "skipped".to_string(),
                        detail: Some(other.to_string()),
                    },
                })
                .collect();

            print_out(cli.json, &reports, |r| match &r.detail {
                Some(d) => format!("{}\t{}\t{}", r.id, r.status, d),
                None => format!("{}\t{}", r.id, r.status),
            })?;
            let unresolved = reports.iter().filter(|r| r.status != "resolved").count();
            if unresolved > 0 {
                anyhow::bail!(
                    "{} of {} violations could not be resolved",
                    unresolved,
                    reports.len()
                );
            }
        }
    }
    Ok(())
}
