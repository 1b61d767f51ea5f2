//! Alarm command handlers.

use remi_core::entity::{AlarmSwitch, alarm_switches};
use remi_core::{
    ClockFace, Command as CoreCommand, CommandResult, Coordinator, CreateAlarmRequest,
    UpdateAlarmRequest,
};
use tabled::Tabled;

use crate::cli::{AlarmsArgs, AlarmsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output::{self, Painter};

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct AlarmRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Repeat")]
    repeat: String,
    #[tabled(rename = "Face")]
    face: String,
}

fn alarm_row(alarm: &AlarmSwitch, painter: Painter) -> AlarmRow {
    let attrs = &alarm.attributes;
    AlarmRow {
        id: alarm.event_id.clone(),
        name: alarm.name.clone(),
        state: painter.on_off(alarm.is_on),
        time: attrs.time.clone().unwrap_or_else(|| "-".into()),
        repeat: attrs
            .recurrence
            .as_ref()
            .filter(|days| !days.is_empty())
            .map_or_else(|| "once".into(), |days| days.join(",")),
        face: attrs.face.clone().unwrap_or_default(),
    }
}

fn alarm_detail(alarm: &AlarmSwitch, painter: Painter) -> String {
    let attrs = &alarm.attributes;
    let mut lines = vec![
        format!("ID:         {}", alarm.event_id),
        format!("Name:       {}", alarm.name),
        format!("State:      {}", painter.on_off(alarm.is_on)),
    ];
    if let Some(ref time) = attrs.time {
        lines.push(format!("Time:       {time}"));
    }
    if let Some(ref days) = attrs.recurrence {
        lines.push(format!("Repeat:     {}", days.join(",")));
    }
    if let Some(v) = attrs.volume {
        lines.push(format!("Volume:     {v}"));
    }
    if let Some(b) = attrs.brightness {
        lines.push(format!("Brightness: {b}"));
    }
    if let Some(l) = attrs.length_min {
        lines.push(format!("Length:     {l} min"));
    }
    if let Some(ref face) = attrs.face {
        lines.push(format!("Face:       {face}"));
    }
    lines.join("\n")
}

fn face_name(face: Option<crate::cli::FaceArg>) -> Option<String> {
    face.map(|f| ClockFace::from(f).to_string())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    coordinator: &Coordinator,
    args: AlarmsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let painter = Painter::new(&global.color);

    match args.command {
        AlarmsCommand::List => {
            let snapshot = util::require_snapshot(coordinator)?;
            let alarms = alarm_switches(&util::device_id(coordinator)?, &snapshot.events);
            let out = output::render_list(
                &global.output,
                &alarms,
                |a| alarm_row(a, painter),
                |a| a.event_id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AlarmsCommand::Get { id } => {
            let event = util::find_event(coordinator, &id)?;
            let alarm = AlarmSwitch::from_event(&util::device_id(coordinator)?, &event);
            let out = output::render_single(
                &global.output,
                &alarm,
                |a| alarm_detail(a, painter),
                |a| a.event_id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AlarmsCommand::Create {
            name,
            time,
            repeat,
            face,
            volume,
            disabled,
        } => {
            let mut request = CreateAlarmRequest::new(name, time);
            request.enabled = !disabled;
            request.repeat = repeat;
            request.face = face_name(face);
            request.volume = volume;

            let result = coordinator.execute(CoreCommand::CreateAlarm(request)).await?;
            if let CommandResult::Created { id } = result {
                output::print_output(&id, global.quiet);
            }
            Ok(())
        }

        AlarmsCommand::Update {
            id,
            name,
            time,
            repeat,
            face,
            volume,
        } => {
            util::find_event(coordinator, &id)?;
            let update = UpdateAlarmRequest {
                name,
                time,
                repeat,
                face: face_name(face),
                volume,
                ..UpdateAlarmRequest::default()
            };
            coordinator
                .execute(CoreCommand::UpdateAlarm {
                    event_id: id,
                    update,
                })
                .await?;
            if !global.quiet {
                eprintln!("Alarm updated");
            }
            Ok(())
        }

        AlarmsCommand::Delete { id } => {
            let event = util::find_event(coordinator, &id)?;
            let label = event.name.unwrap_or_else(|| id.clone());
            if !util::confirm(&format!("Delete alarm '{label}'?"), global.yes)? {
                return Ok(());
            }
            coordinator
                .execute(CoreCommand::DeleteAlarm { event_id: id })
                .await?;
            if !global.quiet {
                eprintln!("Alarm deleted");
            }
            Ok(())
        }

        AlarmsCommand::Enable { id } => set_enabled(coordinator, id, true, global).await,
        AlarmsCommand::Disable { id } => set_enabled(coordinator, id, false, global).await,
    }
}

async fn set_enabled(
    coordinator: &Coordinator,
    id: String,
    enabled: bool,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    util::find_event(coordinator, &id)?;
    coordinator
        .execute(CoreCommand::SetAlarmEnabled {
            event_id: id,
            enabled,
        })
        .await?;
    if !global.quiet {
        eprintln!("Alarm {}", if enabled { "enabled" } else { "disabled" });
    }
    Ok(())
}
