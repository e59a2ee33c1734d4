use super::render;
use super::setup::{
    Cli, Commands, ConfigCommands, NotesCommands, StorageCommands, TodosCommands, WsArg,
    WsCommands,
};
use anyhow::{bail, Context, Result};
use chrono::Utc;
use quickstartapp::api::QuickStartApi;
use quickstartapp::init::AppContext;
use quickstartapp::model::{day_of, month_of, NoteDraft};
use serde_json::{Map, Value};
use std::fs;
use std::io::{IsTerminal, Read};
use std::path::PathBuf;

pub fn dispatch(ctx: AppContext, cli: Cli) -> Result<()> {
    let json = cli.json;
    match cli.command {
        Commands::Init => {
            if json {
                render::print_json(&ctx.migration)
            } else {
                render::print_migration(&ctx.migration);
                Ok(())
            }
        }
        Commands::Notes(cmd) => notes(&ctx.api, cmd, json),
        Commands::Ws(cmd) => workspaces(&ctx.api, cmd, json),
        Commands::Todos(cmd) => todos(&ctx.api, cmd, json),
        Commands::Config(cmd) => config(&ctx.api, cmd),
        Commands::Storage(cmd) => storage(&ctx.api, cmd),
    }
}

fn workspace_id(api: &QuickStartApi, arg: &WsArg) -> String {
    arg.ws.clone().unwrap_or_else(|| api.active_workspace())
}

// Same clock as note timestamps, so "today" matches month folders and exports.
fn today() -> String {
    day_of(&Utc::now())
}

fn read_stdin() -> Result<String> {
    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Ok(String::new());
    }
    let mut buf = String::new();
    stdin.read_to_string(&mut buf).context("failed to read stdin")?;
    Ok(buf)
}

fn notes(api: &QuickStartApi, cmd: NotesCommands, json: bool) -> Result<()> {
    match cmd {
        NotesCommands::List { ws, deleted } => {
            let index = api.list_notes(&workspace_id(api, &ws));
            if json {
                render::print_json(&index)
            } else {
                render::print_notes(&index, deleted);
                Ok(())
            }
        }
        NotesCommands::Save {
            ws,
            id,
            title,
            tags,
            icon,
            content,
        } => {
            let content = match content {
                Some(c) => c,
                None => read_stdin()?,
            };
            let draft = NoteDraft {
                id,
                title,
                content,
                tags,
                status_icon: icon,
            };
            render::print_outcome(api.save_note(&workspace_id(api, &ws), draft))
        }
        NotesCommands::Show { ws, id } => {
            let ws = workspace_id(api, &ws);
            if api.find_note_file(&ws, &id).is_none() {
                bail!("note not found: {}", id);
            }
            print!("{}", api.load_note(&ws, &id));
            Ok(())
        }
        NotesCommands::Delete { ws, id } => {
            render::print_outcome(api.delete_note(&workspace_id(api, &ws), &id))
        }
        NotesCommands::Restore { ws, id } => {
            render::print_outcome(api.restore_note(&workspace_id(api, &ws), &id))
        }
        NotesCommands::Icon { ws, id, icon } => {
            render::print_outcome(api.update_note_icon(&workspace_id(api, &ws), &id, icon))
        }
        NotesCommands::Attach { ws, path, name } => {
            let bytes = fs::read(&path).with_context(|| format!("cannot read {}", path.display()))?;
            let name = match name {
                Some(n) => n,
                None => path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .context("attachment path has no file name")?,
            };
            render::print_outcome(api.save_attachment(&workspace_id(api, &ws), &name, &bytes))
        }
        NotesCommands::Export {
            ws,
            id,
            from,
            to,
            out,
        } => {
            let ws = workspace_id(api, &ws);
            let markdown = match (id, from, to) {
                (Some(id), _, _) => api.export_note(&ws, &id).into_result(),
                (None, Some(from), Some(to)) => api
                    .export_notes(&ws, &from, &to)
                    .into_result()
                    .map(|export| export.markdown),
                _ => bail!("pass --id, or both --from and --to"),
            }
            .map_err(anyhow::Error::msg)?;
            write_or_print(out, &markdown)
        }
    }
}

fn write_or_print(out: Option<PathBuf>, text: &str) -> Result<()> {
    match out {
        Some(path) => {
            fs::write(&path, text).with_context(|| format!("cannot write {}", path.display()))?;
            eprintln!("Exported to {}", path.display());
        }
        None => print!("{}", text),
    }
    Ok(())
}

fn workspaces(api: &QuickStartApi, cmd: WsCommands, json: bool) -> Result<()> {
    match cmd {
        WsCommands::List => {
            let list = api.list_workspaces();
            if json {
                render::print_json(&list)
            } else {
                render::print_workspaces(&list, &api.active_workspace());
                Ok(())
            }
        }
        WsCommands::Create { name, color } => {
            render::print_outcome(api.create_workspace(&name, &color))
        }
        WsCommands::Rename { id, name, color } => {
            render::print_outcome(api.rename_workspace(&id, &name, color.as_deref()))
        }
        WsCommands::Delete { id } => render::print_outcome(api.delete_workspace(&id)),
        WsCommands::Use { id } => render::print_outcome(api.set_active_workspace(&id)),
    }
}

fn todos(api: &QuickStartApi, cmd: TodosCommands, json: bool) -> Result<()> {
    match cmd {
        TodosCommands::Show { date } => {
            let date = date.unwrap_or_else(today);
            let day = api.load_todos(&date).into_result().map_err(anyhow::Error::msg)?;
            if json {
                render::print_json(&day)
            } else {
                render::print_todo_day(&day);
                Ok(())
            }
        }
        TodosCommands::Summary { month } => {
            let month = month.unwrap_or_else(|| month_of(&Utc::now()));
            let summary = api
                .todo_month_summary(&month)
                .into_result()
                .map_err(anyhow::Error::msg)?;
            if json {
                render::print_json(&summary)
            } else {
                render::print_month_summary(&month, &summary);
                Ok(())
            }
        }
        TodosCommands::Add { date, content } => {
            let date = date.unwrap_or_else(today);
            render::print_outcome(api.add_todo(&date, &content))
        }
        TodosCommands::Export { from, to, out } => {
            let export = api
                .export_todos(&from, &to)
                .into_result()
                .map_err(anyhow::Error::msg)?;
            write_or_print(out, &export.markdown)
        }
        TodosCommands::Done { id, date, undo } => {
            let date = date.unwrap_or_else(today);
            render::print_outcome(api.set_todo_done(&date, &id, !undo))
        }
    }
}

fn config(api: &QuickStartApi, cmd: ConfigCommands) -> Result<()> {
    match cmd {
        ConfigCommands::Get { key } => {
            let value = api.config_value().into_result().map_err(anyhow::Error::msg)?;
            match key {
                None => render::print_json(&value),
                Some(key) => match value.get(&key) {
                    Some(v) => render::print_json(v),
                    None => bail!("no config key '{}'", key),
                },
            }
        }
        ConfigCommands::Set { key, value } => {
            let parsed = serde_json::from_str(&value).unwrap_or(Value::String(value));
            let mut partial = Map::new();
            partial.insert(key, parsed);
            render::print_outcome(api.set_config(partial))
        }
    }
}

fn storage(api: &QuickStartApi, cmd: StorageCommands) -> Result<()> {
    match cmd {
        StorageCommands::Root {
            path,
            reset,
            migrate,
        } => {
            if path.is_none() && !reset {
                let config = api.config();
                println!("{}", api.paths().workspaces_root_for(&config).display());
                return Ok(());
            }
            render::print_outcome(api.set_root_path(path, migrate))
        }
        StorageCommands::TodosPath {
            path,
            reset,
            migrate,
        } => {
            if path.is_none() && !reset {
                let config = api.config();
                println!("{}", api.paths().todos_dir_for(&config).display());
                return Ok(());
            }
            render::print_outcome(api.set_todos_path(path, migrate))
        }
        StorageCommands::ClearNotes { ws, yes } => {
            if !yes {
                bail!("clearing notes needs --yes (a backup archive is written first)");
            }
            render::print_outcome(api.clear_notes(&workspace_id(api, &ws)))
        }
        StorageCommands::ClearTodos { yes } => {
            if !yes {
                bail!("clearing todos needs --yes (a backup archive is written first)");
            }
            render::print_outcome(api.clear_todos())
        }
    }
}
