//! Command handlers.

use std::path::Path;

use anyhow::{bail, Context};
use clap::ArgMatches;
use timetabler_client::api::{BulkImportable, TimetablerApi};
use timetabler_client::config::ClientConfig;
use timetabler_client::progress::ProgressClient;
use timetabler_core::generation::GenerationStatus;
use timetabler_core::models::{
    AcademicHalf, Course, CreateTimetable, Department, Lecturer, Room, StudentGroup, Timetable,
};
use timetabler_core::session::Session;
use timetabler_core::types::DbId;

use crate::generate;
use crate::render::{self, TableRow};

/// Sign in with `username`, or fall back to the configured token.
pub async fn establish_session(
    api: &TimetablerApi,
    config: &ClientConfig,
    username: Option<&str>,
) -> anyhow::Result<Session> {
    if let Some(username) = username {
        return api
            .login(username)
            .await
            .with_context(|| format!("Login failed for {username}"));
    }

    let Some(token) = config.token.as_deref() else {
        bail!("Not signed in: pass --username or set TIMETABLER_TOKEN");
    };
    let mut session = Session::with_token(token);
    let user = api
        .me(&session)
        .await
        .context("TIMETABLER_TOKEN was rejected by the backend")?;
    session.set_user(user);
    Ok(session)
}

/// Everything a command needs: the backend clients and the signed-in session.
pub struct App {
    pub api: TimetablerApi,
    pub config: ClientConfig,
    pub session: Session,
}

impl App {
    pub async fn dispatch(&self, matches: &ArgMatches) -> anyhow::Result<()> {
        match matches.subcommand() {
            Some(("whoami", _)) => self.whoami(),
            Some(("timetables", m)) => self.timetables(m).await,
            Some(("departments", m)) => self.departments(m).await,
            Some(("courses", m)) => self.entities::<Course>(m).await,
            Some(("lecturers", m)) => self.entities::<Lecturer>(m).await,
            Some(("rooms", m)) => self.entities::<Room>(m).await,
            Some(("groups", m)) => self.entities::<StudentGroup>(m).await,
            Some((other, _)) => bail!("Unknown command: {other}"),
            None => bail!("No command given"),
        }
    }

    fn whoami(&self) -> anyhow::Result<()> {
        let user = self.session.user().context("No profile loaded")?;
        println!("{}", render::user(user));
        Ok(())
    }

    // ---- timetables ----

    async fn timetables(&self, matches: &ArgMatches) -> anyhow::Result<()> {
        match matches.subcommand() {
            Some(("list", _)) => {
                let timetables = self.api.list::<Timetable>(&self.session).await?;
                println!("{}", render::table(&timetables));
            }
            Some(("create", m)) => {
                self.session.require_coordinator()?;
                let payload = CreateTimetable {
                    name: required(m, "name")?,
                    semester: required(m, "semester")?,
                    year: *m.get_one::<i32>("year").context("--year is required")?,
                    academic_half: if m.get_flag("second_half") {
                        AcademicHalf::SecondHalf
                    } else {
                        AcademicHalf::FirstHalf
                    },
                };
                let created: Timetable = self.api.create(&self.session, &payload).await?;
                println!("Created timetable {} ({})", created.id, created.name);

                if m.get_flag("generate") {
                    self.generate(created.id, m.get_flag("json")).await?;
                }
            }
            Some(("activate", m)) => {
                self.session.require_coordinator()?;
                let timetable = self
                    .api
                    .activate_timetable(&self.session, id(m)?)
                    .await?;
                println!("Timetable {} is now active", timetable.id);
            }
            Some(("delete", m)) => {
                self.session.require_coordinator()?;
                let id = id(m)?;
                self.api.delete::<Timetable>(&self.session, id).await?;
                println!("Deleted timetable {id}");
            }
            Some(("generate", m)) => self.generate(id(m)?, m.get_flag("json")).await?,
            _ => bail!("Unknown timetables command"),
        }
        Ok(())
    }

    async fn generate(&self, timetable_id: DbId, json: bool) -> anyhow::Result<()> {
        self.session.require_coordinator()?;

        let timetable: Timetable = self.api.get(&self.session, timetable_id).await?;
        if timetable.is_generated() {
            bail!("Timetable {timetable_id} has already been generated");
        }

        let client = ProgressClient::from_config(&self.config, &self.session);
        let snapshot = generate::follow(&client, timetable_id).await?;

        if json {
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        } else {
            println!("{}", render::level_summary(&snapshot));
        }

        match snapshot.status {
            GenerationStatus::Succeeded => Ok(()),
            _ => bail!(render::outcome(&snapshot)),
        }
    }

    // ---- departments ----

    async fn departments(&self, matches: &ArgMatches) -> anyhow::Result<()> {
        match matches.subcommand() {
            Some(("list", _)) => {
                let departments = self.api.list::<Department>(&self.session).await?;
                println!("{}", render::table(&departments));
            }
            Some(("delete", m)) => {
                let id = id(m)?;
                self.api.delete::<Department>(&self.session, id).await?;
                println!("Deleted department {id}");
            }
            _ => bail!("Unknown departments command"),
        }
        Ok(())
    }

    // ---- courses, lecturers, rooms, groups ----

    async fn entities<R>(&self, matches: &ArgMatches) -> anyhow::Result<()>
    where
        R: BulkImportable + TableRow,
    {
        match matches.subcommand() {
            Some(("list", _)) => {
                let rows = self.api.list::<R>(&self.session).await?;
                println!("{}", render::table(&rows));
            }
            Some(("delete", m)) => {
                let id = id(m)?;
                self.api.delete::<R>(&self.session, id).await?;
                println!("Deleted {} {id}", R::COLLECTION);
            }
            Some(("import", m)) => {
                let path = m
                    .get_one::<std::path::PathBuf>("file")
                    .context("a file is required")?;
                let (file_name, contents) = read_upload(path).await?;
                let report = self
                    .api
                    .bulk_upload::<R>(&self.session, &file_name, contents)
                    .await?;
                println!("{}", render::upload_report(&report));
            }
            _ => bail!("Unknown {} command", R::COLLECTION),
        }
        Ok(())
    }
}

fn id(matches: &ArgMatches) -> anyhow::Result<DbId> {
    matches
        .get_one::<DbId>("id")
        .copied()
        .context("an id is required")
}

fn required(matches: &ArgMatches, name: &str) -> anyhow::Result<String> {
    matches
        .get_one::<String>(name)
        .cloned()
        .with_context(|| format!("{name} is required"))
}

async fn read_upload(path: &Path) -> anyhow::Result<(String, Vec<u8>)> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("{} is not a file path", path.display()))?
        .to_string();
    let contents = tokio::fs::read(path)
        .await
        .with_context(|| format!("Cannot read {}", path.display()))?;
    Ok((file_name, contents))
}
