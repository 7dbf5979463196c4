// crates/host/src/app.rs

//! Wiring between the command line and the core: one method per subcommand.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::{json, Map};
use tracing::{info, warn};

use verlofrooster_core::actions::{delete_by_type, ActionOutcome, ItemKind};
use verlofrooster_core::context::DEFAULT_SITE_PATH;
use verlofrooster_core::error_handler::{report_error, ErrorReport};
use verlofrooster_core::list_access::{ListClient, ListQuery, ListReader};
use verlofrooster_core::mock::{mock_context, DataSource, MockDataProvider};
use verlofrooster_core::requests::{decide, submit, Decision, NewRequest};
use verlofrooster_core::roster::{load_month, RosterMonth};
use verlofrooster_core::transport::{Credentials, ReqwestTransport};
use verlofrooster_core::{ContextBootstrap, ListRegistry, NotificationCenter, PermissionRules, SiteConfig};

use crate::cli::{AanvraagArgs, Cli, Commands, ItemsArgs};

const MOCK_ORIGIN: &str = "http://localhost";

pub struct App {
    registry: Arc<ListRegistry>,
    rules: PermissionRules,
    bootstrap: ContextBootstrap,
    source: DataSource<ReqwestTransport>,
}

fn site_config(cli: &Cli, origin: &str) -> SiteConfig {
    let mut config = SiteConfig::new(
        origin,
        cli.site_path.as_deref().unwrap_or(DEFAULT_SITE_PATH),
    );
    config.credentials = Credentials::from_parts(cli.token.clone(), cli.cookie.clone());
    config.timeout = Duration::from_secs(cli.timeout);
    config
}

impl App {
    /// Load the list registry, pick a data source and resolve the user.
    ///
    /// A failed bootstrap is reported but not fatal: reads still work and
    /// every permission check denies.
    pub fn connect(cli: &Cli, notifications: &mut NotificationCenter) -> Result<Self> {
        let mut registry = ListRegistry::builtin();
        if let Some(path) = &cli.lists_file {
            registry = registry.merge_file(path)?;
        }
        let registry = Arc::new(registry);
        let mock = MockDataProvider::new(Arc::clone(&registry));

        let origin = match (&cli.origin, cli.mock) {
            (Some(origin), _) => origin.as_str(),
            (None, true) => MOCK_ORIGIN,
            (None, false) => anyhow::bail!("geen --origin of VERLOF_SITE_ORIGIN opgegeven"),
        };
        let config = site_config(cli, origin);
        let site_url = config.site_url()?;

        let source = if cli.mock {
            DataSource::Mock(mock)
        } else {
            let transport = ReqwestTransport::new(config.credentials.clone(), config.timeout)?;
            let client = ListClient::new(transport, Arc::clone(&registry), site_url.clone());
            DataSource::select(client, origin, mock)
        };

        let bootstrap = match source.live() {
            Some(client) => {
                let bootstrap = ContextBootstrap::new();
                if let Err(err) = bootstrap.run(client.transport(), &config) {
                    report_error(
                        notifications,
                        &ErrorReport::from_bootstrap_error(&err).with_context("Opstarten"),
                    );
                }
                bootstrap
            }
            None => {
                notifications.info("Mock-modus: gegevens komen niet uit SharePoint.");
                ContextBootstrap::resolved(mock_context(&site_url))
            }
        };

        info!(%site_url, mock = source.is_mock(), lists = registry.len(), "connected");

        Ok(Self {
            registry,
            rules: PermissionRules::builtin(),
            bootstrap,
            source,
        })
    }

    pub fn execute(&self, command: Commands, notifications: &mut NotificationCenter) -> Result<ExitCode> {
        match command {
            Commands::Whoami => Ok(self.whoami()),
            Commands::Lists => {
                self.lists();
                Ok(ExitCode::SUCCESS)
            }
            Commands::Items(args) => self.items(&args),
            Commands::Rooster { year, month } => self.rooster(year, month),
            Commands::Aanvraag(args) => self.aanvraag(&args, notifications),
            Commands::Goedkeuren { id, opmerking } => {
                self.behandel(id, Decision::Approve, opmerking, notifications)
            }
            Commands::Afwijzen { id, opmerking } => {
                self.behandel(id, Decision::Reject, opmerking, notifications)
            }
            Commands::Verwijder { soort, id, yes } => self.verwijder(&soort, id, yes, notifications),
            Commands::Toegang { sectie } => Ok(self.toegang(sectie.as_deref())),
            Commands::Feedback { tekst, categorie } => {
                self.feedback(&tekst, categorie.as_deref(), notifications)
            }
        }
    }

    fn writer(&self) -> Result<&ListClient<ReqwestTransport>> {
        self.source
            .live()
            .context("wijzigen is niet mogelijk met mock-gegevens")
    }

    fn whoami(&self) -> ExitCode {
        let Some(user) = self.bootstrap.current_user() else {
            return ExitCode::FAILURE;
        };

        println!("{} ({})", user.display_name, user.username);
        if !user.email.is_empty() {
            println!("  e-mail: {}", user.email);
        }
        if user.is_site_admin {
            println!("  sitebeheerder");
        }
        println!("  groepen:");
        for group in &user.groups {
            println!("    - {group}");
        }
        ExitCode::SUCCESS
    }

    fn lists(&self) {
        for list in self.registry.iter() {
            let hidden = if list.hidden { " (verborgen)" } else { "" };
            println!("{:<24} {:<24} {}{}", list.key, list.title, list.guid, hidden);
        }
    }

    fn items(&self, args: &ItemsArgs) -> Result<ExitCode> {
        let mut query = ListQuery::new();
        if let Some(select) = &args.select {
            query = query.select(select.as_str());
        }
        if let Some(filter) = &args.filter {
            query = query.filter(filter.as_str());
        }
        if let Some(expand) = &args.expand {
            query = query.expand(expand.as_str());
        }
        if let Some(orderby) = &args.orderby {
            query = query.orderby(orderby.as_str());
        }
        if let Some(top) = args.top {
            query = query.top(top);
        }

        let items = self.source.get_items(&args.key, &query)?;
        for item in &items {
            println!("{:>6}  {}", item.id, serde_json::to_string(&item.fields)?);
        }
        println!("{} item(s)", items.len());
        Ok(ExitCode::SUCCESS)
    }

    fn rooster(&self, year: Option<i32>, month: Option<u32>) -> Result<ExitCode> {
        let today = Local::now().date_naive();
        let year = year.unwrap_or(today.year());
        let month = month.unwrap_or(today.month());

        let roster = load_month(&self.source, year, month)?
            .with_context(|| format!("ongeldige maand: {year}-{month}"))?;
        print_roster(&roster);
        Ok(ExitCode::SUCCESS)
    }

    fn aanvraag(&self, args: &AanvraagArgs, notifications: &mut NotificationCenter) -> Result<ExitCode> {
        let kind = ItemKind::parse(&args.soort)
            .with_context(|| format!("onbekend soort aanvraag: '{}'", args.soort))?;
        let Some(user) = self.bootstrap.current_user() else {
            return Ok(ExitCode::FAILURE);
        };

        let mut request = NewRequest::for_user(
            kind,
            user,
            parse_moment(&args.start, false)?,
            parse_moment(&args.end, true)?,
        );
        if let Some(text) = &args.omschrijving {
            request = request.omschrijving(text.as_str());
        }
        if let Some(uren) = args.uren {
            request = request.uren(uren);
        }

        let item = submit(self.writer()?, &request)?;
        notifications.success(format!("{} ingediend (#{}).", kind.label(), item.id));
        Ok(ExitCode::SUCCESS)
    }

    fn behandel(
        &self,
        id: u32,
        decision: Decision,
        opmerking: Option<String>,
        notifications: &mut NotificationCenter,
    ) -> Result<ExitCode> {
        decide(
            self.writer()?,
            &self.rules,
            &self.bootstrap.groups(),
            id,
            decision,
            opmerking.as_deref(),
        )?;
        notifications.success(format!("Aanvraag #{id}: {}.", decision.status()));
        Ok(ExitCode::SUCCESS)
    }

    fn verwijder(
        &self,
        soort: &str,
        id: u32,
        yes: bool,
        notifications: &mut NotificationCenter,
    ) -> Result<ExitCode> {
        let client = self.writer()?;
        if !yes && !confirm(&format!("{soort} #{id} verwijderen?"))? {
            println!("Geannuleerd.");
            return Ok(ExitCode::SUCCESS);
        }

        Ok(match delete_by_type(client, notifications, soort, id) {
            ActionOutcome::Done => ExitCode::SUCCESS,
            ActionOutcome::UnknownType | ActionOutcome::Failed => ExitCode::FAILURE,
        })
    }

    fn toegang(&self, sectie: Option<&str>) -> ExitCode {
        let groups = self.bootstrap.groups();
        let line = |section: &str| {
            let allowed = self.rules.is_allowed(section, &groups);
            let label = if allowed { "toegang" } else { "geen toegang" };
            println!("{section:<20} {label}");
            allowed
        };

        match sectie {
            Some(section) if line(section) => ExitCode::SUCCESS,
            Some(_) => ExitCode::FAILURE,
            None => {
                for section in self.rules.sections() {
                    line(section);
                }
                ExitCode::SUCCESS
            }
        }
    }

    fn feedback(
        &self,
        tekst: &str,
        categorie: Option<&str>,
        notifications: &mut NotificationCenter,
    ) -> Result<ExitCode> {
        let tekst = tekst.trim();
        if tekst.is_empty() {
            anyhow::bail!("lege feedback");
        }
        let title: String = tekst.lines().next().unwrap_or(tekst).chars().take(80).collect();

        let mut fields = Map::new();
        fields.insert("Title".to_string(), json!(title));
        fields.insert("Beschrijving".to_string(), json!(tekst));
        fields.insert("Status".to_string(), json!("Nieuw"));
        if let Some(categorie) = categorie {
            fields.insert("Categorie".to_string(), json!(categorie));
        }

        let item = self.writer()?.create_item("FeedbackForum", fields)?;
        notifications.success(format!("Feedback geplaatst (#{}).", item.id));
        Ok(ExitCode::SUCCESS)
    }
}

/// `YYYY-MM-DDTHH:MM`, or a bare date at the start or end of that day.
fn parse_moment(s: &str, end_of_day: bool) -> Result<DateTime<Utc>> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M") {
        return Ok(dt.and_utc());
    }
    let date: NaiveDate = s
        .parse()
        .with_context(|| format!("ongeldige datum: '{s}'"))?;
    let (hour, minute) = if end_of_day { (23, 59) } else { (0, 0) };
    let time = NaiveTime::from_hms_opt(hour, minute, 0).context("invalid time")?;
    Ok(date.and_time(time).and_utc())
}

fn confirm(prompt: &str) -> Result<bool> {
    eprint!("{prompt} [j/N] ");
    io::stderr().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "j" | "ja" | "y" | "yes"
    ))
}

fn print_roster(roster: &RosterMonth) {
    if roster.rows.is_empty() {
        warn!(month = %roster.first_day, "no employees to show");
    }

    let width = roster
        .rows
        .iter()
        .map(|r| r.name.chars().count())
        .max()
        .unwrap_or(0)
        .max(12);

    println!("{}", roster.first_day.format("%B %Y"));
    print!("{:width$} ", "");
    for day in &roster.days {
        print!("{:>4}", day.day());
    }
    println!();

    let mut team: Option<&Option<String>> = None;
    for row in &roster.rows {
        if team != Some(&row.team) {
            println!("{}", row.team.as_deref().unwrap_or("(geen team)"));
            team = Some(&row.team);
        }
        print!("{:width$} ", row.name);
        for cell in &row.cells {
            let text = match cell.entry {
                Some(entry) if entry.pending => entry.code.code().to_lowercase(),
                Some(entry) => entry.code.code().to_string(),
                None if cell.weekend => "·".to_string(),
                None => ".".to_string(),
            };
            print!("{text:>4}");
        }
        println!();
    }

    println!();
    println!("VER verlof  ZK ziekte  CU compensatie  ZV zittingsvrij  (kleine letters: nog niet behandeld)");
}
