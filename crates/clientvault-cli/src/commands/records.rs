use clientvault_core::{EncryptedRecord, NewRecord, RecordStore, SqliteStore};
use uuid::Uuid;

use crate::app::AppContext;
use crate::cli::{AddArgs, DeleteArgs, EditArgs, ListArgs, ShowArgs};
use crate::errors::CliError;
use crate::helpers::{parse_record_id, parse_record_kind, read_record_data};
use crate::output::{print_record, print_record_list, record_json, records_json};

fn record_not_found(id: &Uuid) -> CliError {
    CliError::not_found(
        format!("Record not found: {}", id),
        "Run:\n  clientvault list",
    )
}

fn fetch_record(
    ctx: &AppContext,
    store: &SqliteStore,
    id: &Uuid,
) -> anyhow::Result<EncryptedRecord> {
    store
        .get_record(&ctx.user_id()?, id)?
        .ok_or_else(|| record_not_found(id).into())
}

pub fn handle_add(ctx: &AppContext, args: &AddArgs) -> anyhow::Result<()> {
    let kind = parse_record_kind(&args.kind)?;
    let data = read_record_data(args.no_input, args.data.clone())?;

    let store = ctx.open_store()?;
    let session = ctx.unlocked_session(&store, args.no_input)?;
    let payload = session.seal_value(kind, &data)?;
    let id = store.insert_record(&NewRecord::new(session.user_id(), kind, payload))?;

    if ctx.quiet() {
        println!("{}", id);
    } else {
        println!("Added {} {}", kind, id);
    }
    Ok(())
}

pub fn handle_edit(ctx: &AppContext, args: &EditArgs) -> anyhow::Result<()> {
    let id = parse_record_id(&args.id)?;
    let data = read_record_data(args.no_input, args.data.clone())?;

    let store = ctx.open_store()?;
    let record = fetch_record(ctx, &store, &id)?;
    let session = ctx.unlocked_session(&store, args.no_input)?;
    let payload = session.seal_value(record.kind, &data)?;
    store.update_record(session.user_id(), &id, &payload)?;

    if !ctx.quiet() {
        println!("Updated {} {}", record.kind, id);
    }
    Ok(())
}

/// Show one record. An undecryptable record is printed with its error and
/// the command fails.
pub fn handle_show(ctx: &AppContext, args: &ShowArgs) -> anyhow::Result<()> {
    let id = parse_record_id(&args.id)?;

    let store = ctx.open_store()?;
    let record = fetch_record(ctx, &store, &id)?;
    let session = ctx.unlocked_session(&store, args.no_input)?;
    let opened = session
        .open_all_values(std::slice::from_ref(&record))?
        .into_iter()
        .next()
        .ok_or_else(|| record_not_found(&id))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&record_json(&opened)?)?);
    } else {
        print_record(&opened);
    }

    match opened.error() {
        Some(_) => {
            Err(CliError::auth_failed(format!("Record {} could not be decrypted.", id)).into())
        }
        None => Ok(()),
    }
}

/// List records, newest first. Undecryptable records stay in the listing.
pub fn handle_list(ctx: &AppContext, args: &ListArgs) -> anyhow::Result<()> {
    let kind = args.kind.as_deref().map(parse_record_kind).transpose()?;

    let store = ctx.open_store()?;
    let session = ctx.unlocked_session(&store, args.no_input)?;
    let records = store.list_records(session.user_id(), kind)?;
    let opened = session.open_all_values(&records)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&records_json(&opened)?)?);
    } else {
        print_record_list(&opened);
    }
    Ok(())
}

pub fn handle_delete(ctx: &AppContext, args: &DeleteArgs) -> anyhow::Result<()> {
    let id = parse_record_id(&args.id)?;

    let store = ctx.open_store()?;
    let record = fetch_record(ctx, &store, &id)?;
    let session = ctx.unlocked_session(&store, args.no_input)?;
    store.delete_record(session.user_id(), &id)?;

    if !ctx.quiet() {
        println!("Deleted {} {}", record.kind, id);
    }
    Ok(())
}
