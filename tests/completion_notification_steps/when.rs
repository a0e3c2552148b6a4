//! When steps for completion notification BDD scenarios.

use super::world::{CompletionWorld, column_id, run_async};
use rstest_bdd_macros::when;
use taskboard::board::{domain::TaskId, services::UpdateTaskRequest};

#[when(r#"task "{title}" is moved to the "{column}" column"#)]
fn move_task(world: &mut CompletionWorld, title: String, column: String) -> Result<(), eyre::Report> {
    let request = UpdateTaskRequest::new(world.task_id(&title)?).with_column(column_id(&column)?);
    let result = run_async(world.service.update_task_with_transition_check(request));
    world.record(result);
    Ok(())
}

#[when(r#"tasks "{titles}" are bulk moved to the "{column}" column"#)]
fn bulk_move(world: &mut CompletionWorld, titles: String, column: String) -> Result<(), eyre::Report> {
    let ids = titles
        .split(',')
        .map(|title| world.task_id(title.trim()))
        .collect::<Result<Vec<TaskId>, _>>()?;
    let result = run_async(world.service.bulk_move(&ids, column_id(&column)?));
    world.record(result);
    Ok(())
}
