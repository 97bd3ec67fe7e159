mod reports;
mod store;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::fs::{self, File};
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};

use deterrence_core::{
    AnalysisReport, AnalysisRequest, CardCatalog, ComparisonType, GameSession, GroupingVariable,
    JsonPayloadExporter, REPORT_ENDPOINT, ReportExporter, SessionStore, TeamFilter,
    VariableDescriptor, VariableId, run_analysis, select_sessions,
};
use store::JsonFileStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Coloured summary for the terminal
    Console,
    /// Full analysis as JSON
    Json,
    /// Report-style Markdown document
    Markdown,
    /// Per-session value table
    Csv,
}

#[derive(Debug, Parser)]
#[command(name = "deterrence-research", version)]
#[command(
    about = "Research dashboard for Multi-Dimension Deterrence Strategy sessions - descriptive statistics, test recommendations and card rankings"
)]
struct Args {
    /// Session export files (the session list or a single session, JSON)
    #[arg(short = 'f', long = "sessions-file", value_name = "PATH")]
    sessions_files: Vec<PathBuf>,

    /// Sessions to analyze (comma-separated names, or "all")
    #[arg(long)]
    sessions: Option<String>,

    /// Variables to summarize (comma-separated ids, see --list-variables)
    #[arg(long, value_delimiter = ',')]
    variables: Vec<VariableId>,

    /// Grouping variable: team, session, winner or none
    #[arg(long)]
    grouping: Option<GroupingVariable>,

    /// Comparison design: between or within
    #[arg(long)]
    comparison: Option<ComparisonType>,

    /// Hypothesis text (repeat for several panels)
    #[arg(long = "hypothesis")]
    hypotheses: Vec<String>,

    /// Research question text
    #[arg(long)]
    question: Option<String>,

    /// Card ids for the purchase frequency table (comma-separated)
    #[arg(long, value_delimiter = ',')]
    cards: Vec<String>,

    /// Team whose purchases the frequency table displays: both, NATO or Russia
    #[arg(long)]
    team_filter: Option<TeamFilter>,

    /// Statistical test chosen for the exported report
    #[arg(long)]
    methodology: Option<String>,

    /// Research plan (JSON); flags override its values
    #[arg(long)]
    plan: Option<PathBuf>,

    /// Card catalog to use instead of the embedded one
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Write the document generator request body to this path
    #[arg(long)]
    export_payload: Option<PathBuf>,

    /// List the research variables and exit
    #[arg(long)]
    list_variables: bool,

    /// List the card catalog and exit
    #[arg(long)]
    list_cards: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let catalog = load_catalog(args.catalog.as_deref())?;
    if maybe_list(&args, &catalog)? {
        return Ok(());
    }
    if args.sessions_files.is_empty() {
        bail!("no session files given; pass one or more --sessions-file paths");
    }

    let plan = match &args.plan {
        Some(path) => load_plan(path)?,
        None => AnalysisRequest::default(),
    };

    let Analysis {
        all_sessions,
        request,
        report,
    } = analyze_files(&args, plan, &catalog)?;

    let mut output_target = OutputTarget::new(args.output.clone())?;
    match args.report {
        ReportFormat::Console => reports::write_console_report(&mut output_target, &report)?,
        ReportFormat::Json => reports::write_json_report(&mut output_target, &report)?,
        ReportFormat::Markdown => {
            reports::write_markdown_report(&mut output_target, &report, Utc::now())?;
        }
        ReportFormat::Csv => reports::write_csv_report(&mut output_target, &report)?,
    }
    output_target.flush_inner()?;

    if let Some(path) = &args.export_payload {
        let (selected, _) = select_sessions(&all_sessions, &request.sessions);
        let Some(input) = report.report_input(&all_sessions, &selected) else {
            bail!("--export-payload needs a methodology (--methodology or the plan)");
        };
        let payload = JsonPayloadExporter
            .export(&input)
            .context("failed to build report payload")?;
        fs::write(path, payload)
            .with_context(|| format!("failed to write {}", path.display()))?;
        log::info!(
            "wrote POST {REPORT_ENDPOINT} payload to {}",
            path.display()
        );
    }

    Ok(())
}

/// One load of the session files and everything computed from it.
struct Analysis {
    all_sessions: Vec<GameSession>,
    request: AnalysisRequest,
    report: AnalysisReport,
}

fn analyze_files(args: &Args, plan: AnalysisRequest, catalog: &CardCatalog) -> Result<Analysis> {
    let all_sessions = JsonFileStore::new(args.sessions_files.clone())
        .list_sessions()
        .context("failed to load session files")?;
    log::info!("loaded {} session(s)", all_sessions.len());

    let request = build_request(args, plan, &all_sessions);
    let report = run_analysis(&all_sessions, catalog, &request);
    Ok(Analysis {
        all_sessions,
        request,
        report,
    })
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn load_catalog(path: Option<&Path>) -> Result<CardCatalog> {
    let Some(path) = path else {
        return Ok(CardCatalog::default_catalog().clone());
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read card catalog {}", path.display()))?;
    CardCatalog::from_json(&raw)
        .with_context(|| format!("invalid card catalog {}", path.display()))
}

fn load_plan(path: &Path) -> Result<AnalysisRequest> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read research plan {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("invalid research plan {}", path.display()))
}

fn maybe_list(args: &Args, catalog: &CardCatalog) -> Result<bool> {
    if !args.list_variables && !args.list_cards {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    if args.list_variables {
        writeln!(output_target.writer(), "{}", "Research variables:".bold())?;
        for descriptor in VariableDescriptor::catalog() {
            writeln!(
                output_target.writer(),
                "  {:18} {:30} {}",
                descriptor.id.as_str(),
                descriptor.label,
                descriptor.category.dimmed()
            )?;
        }
    }
    if args.list_cards {
        writeln!(output_target.writer(), "{}", "Cards:".bold())?;
        for card in catalog.cards() {
            let domain = card
                .domain
                .map_or_else(|| "-".to_string(), |domain| domain.key().to_string());
            writeln!(
                output_target.writer(),
                "  {:6} {:36} {:10} {}",
                card.id,
                card.name,
                domain,
                card.card_type.dimmed()
            )?;
        }
    }
    output_target.flush_inner()?;
    Ok(true)
}

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Expand a session list, replacing "all" with every known session name.
fn expand_sessions(raw: &str, all_sessions: &[GameSession]) -> Vec<String> {
    let mut names = split_csv(raw);
    if names.iter().any(|name| name.eq_ignore_ascii_case("all")) {
        names.retain(|name| !name.eq_ignore_ascii_case("all"));
        names.extend(
            all_sessions
                .iter()
                .map(|session| session.session_name.clone()),
        );
    }
    names
}

/// Merge flags over the plan. Without any session selection every loaded
/// session is analyzed.
fn build_request(
    args: &Args,
    plan: AnalysisRequest,
    all_sessions: &[GameSession],
) -> AnalysisRequest {
    let mut request = plan;
    if let Some(raw) = &args.sessions {
        request.sessions = expand_sessions(raw, all_sessions);
    } else if request.sessions.is_empty() {
        request.sessions = expand_sessions("all", all_sessions);
    }
    if !args.variables.is_empty() {
        request.variables.clone_from(&args.variables);
    }
    if let Some(grouping) = args.grouping {
        request.grouping_variable = grouping;
    }
    if let Some(comparison) = args.comparison {
        request.comparison_type = comparison;
    }
    if !args.hypotheses.is_empty() {
        request.hypotheses.clone_from(&args.hypotheses);
    }
    if args.question.is_some() {
        request.research_question.clone_from(&args.question);
    }
    if !args.cards.is_empty() {
        request.cards.clone_from(&args.cards);
    }
    if let Some(team_filter) = args.team_filter {
        request.team_filter = team_filter;
    }
    if args.methodology.is_some() {
        request.methodology.clone_from(&args.methodology);
    }
    request
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args {
            sessions_files: vec![PathBuf::from("sessions.json")],
            sessions: None,
            variables: Vec::new(),
            grouping: None,
            comparison: None,
            hypotheses: Vec::new(),
            question: None,
            cards: Vec::new(),
            team_filter: None,
            methodology: None,
            plan: None,
            catalog: None,
            report: ReportFormat::Console,
            output: None,
            export_payload: None,
            list_variables: false,
            list_cards: false,
            verbose: false,
        }
    }

    fn sessions() -> Vec<GameSession> {
        vec![GameSession::named("a"), GameSession::named("b")]
    }

    #[test]
    fn args_parse_typed_values() {
        let args = Args::try_parse_from([
            "deterrence-research",
            "-f",
            "one.json",
            "--sessions-file",
            "two.json",
            "--variables",
            "nato_total,russia_cyber",
            "--grouping",
            "winner",
            "--comparison",
            "within",
            "--team-filter",
            "NATO",
            "--hypothesis",
            "first",
            "--hypothesis",
            "second",
            "--report",
            "markdown",
        ])
        .expect("valid args");
        assert_eq!(args.sessions_files.len(), 2);
        assert_eq!(
            args.variables,
            vec![VariableId::NatoTotal, VariableId::RussiaCyber]
        );
        assert_eq!(args.grouping, Some(GroupingVariable::Winner));
        assert_eq!(args.comparison, Some(ComparisonType::Within));
        assert_eq!(args.team_filter, Some(TeamFilter::Nato));
        assert_eq!(args.hypotheses.len(), 2);
        assert_eq!(args.report, ReportFormat::Markdown);
    }

    #[test]
    fn args_reject_unknown_variables() {
        let err = Args::try_parse_from(["deterrence-research", "--variables", "nato_morale"])
            .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn default_selection_is_every_session() {
        let request = build_request(&base_args(), AnalysisRequest::default(), &sessions());
        assert_eq!(request.sessions, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn flags_override_plan() {
        let plan: AnalysisRequest = serde_json::from_str(
            r#"{
                "sessions": ["b"],
                "variables": ["turn_count"],
                "groupingVariable": "team",
                "methodology": "MANOVA",
                "cards": ["J1"]
            }"#,
        )
        .unwrap();
        let mut args = base_args();
        args.variables = vec![VariableId::CardCount];
        args.grouping = Some(GroupingVariable::Session);
        let request = build_request(&args, plan.clone(), &sessions());
        assert_eq!(request.sessions, vec!["b".to_string()]);
        assert_eq!(request.variables, vec![VariableId::CardCount]);
        assert_eq!(request.grouping_variable, GroupingVariable::Session);
        assert_eq!(request.methodology.as_deref(), Some("MANOVA"));
        assert_eq!(request.cards, vec!["J1".to_string()]);

        args.sessions = Some("all, a".to_string());
        let request = build_request(&args, plan, &sessions());
        assert_eq!(
            request.sessions,
            vec!["a".to_string(), "a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn files_feed_report_and_payload_from_one_load() {
        let path = std::env::temp_dir().join(format!(
            "deterrence-sessions-{}.json",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ));
        fs::write(
            &path,
            r#"[{"sessionName": "a", "gameState": {"teams": {"NATO": {"totalDeterrence": 4}}}},
                {"sessionName": "b", "gameState": null}]"#,
        )
        .unwrap();
        let mut args = base_args();
        args.sessions_files = vec![path.clone()];
        args.variables = vec![VariableId::NatoTotal];
        args.methodology = Some("MANOVA".to_string());

        let analysis =
            analyze_files(&args, AnalysisRequest::default(), CardCatalog::default_catalog())
                .unwrap();
        let _ = fs::remove_file(path);

        assert_eq!(analysis.all_sessions.len(), 2);
        assert_eq!(analysis.report.selected_sessions, vec!["a", "b"]);
        assert_eq!(analysis.report.summary[&VariableId::NatoTotal].mean, "2.00");

        let (selected, _) = select_sessions(&analysis.all_sessions, &analysis.request.sessions);
        let input = analysis
            .report
            .report_input(&analysis.all_sessions, &selected)
            .unwrap();
        assert_eq!(input.selected_sessions.len(), 2);
        assert_eq!(input.all_sessions.len(), 2);
    }

    #[test]
    fn missing_files_fail_with_context() {
        let mut args = base_args();
        args.sessions_files = vec![PathBuf::from("/definitely/not/here.json")];
        let err = analyze_files(&args, AnalysisRequest::default(), CardCatalog::default_catalog())
            .err()
            .unwrap();
        assert!(format!("{err:#}").starts_with("failed to load session files"));
    }

    #[test]
    fn split_csv_trims_and_filters() {
        assert_eq!(split_csv(" alpha, ,beta "), vec!["alpha", "beta"]);
    }

    #[test]
    fn catalog_override_is_validated() {
        let path = std::env::temp_dir().join(format!(
            "deterrence-catalog-{}.json",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ));
        fs::write(&path, r#"[{"id": "A"}, {"id": "A"}]"#).unwrap();
        let err = load_catalog(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("more than once"));
        let _ = fs::remove_file(path);
        assert!(!load_catalog(None).unwrap().is_empty());
    }

    #[test]
    fn output_target_writes_file() {
        let path = std::env::temp_dir().join(format!(
            "deterrence-output-{}.txt",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ));
        let mut target = OutputTarget::new(Some(path.clone())).unwrap();
        writeln!(target, "hello").unwrap();
        target.flush_inner().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello\n");
        let _ = fs::remove_file(path);
    }
}
