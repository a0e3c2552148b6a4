//! Given steps for completion notification BDD scenarios.

use super::world::CompletionWorld;
use eyre::WrapErr;
use rstest_bdd_macros::given;
use taskboard::board::domain::{EmailAddress, User, UserId};

#[given(r#"a board owned by "{email}""#)]
fn board_owned_by(world: &mut CompletionWorld, email: String) -> Result<(), eyre::Report> {
    world.seed_columns()?;
    let address = EmailAddress::new(email).wrap_err("parse owner email")?;
    let owner = User::new(UserId::new()).with_email(address);
    world.owner = Some(owner.id());
    world.store.insert_user(owner).wrap_err("seed owner")?;
    Ok(())
}

#[given(r#"the "{column}" column holds the task "{title}""#)]
fn column_holds_task(
    world: &mut CompletionWorld,
    column: String,
    title: String,
) -> Result<(), eyre::Report> {
    world.add_task(&column, &title, true)
}

#[given(r#"the "{column}" column holds the unowned task "{title}""#)]
fn column_holds_unowned_task(
    world: &mut CompletionWorld,
    column: String,
    title: String,
) -> Result<(), eyre::Report> {
    world.add_task(&column, &title, false)
}

#[given("the mail transport is down")]
fn mail_transport_down(world: &mut CompletionWorld) -> Result<(), eyre::Report> {
    world.sender.set_failure(Some("mail relay unreachable".to_owned()))?;
    Ok(())
}
