//! Given steps for task ordering BDD scenarios.

use super::world::OrderingWorld;
use eyre::WrapErr;
use rstest_bdd_macros::given;
use taskboard::board::domain::{EmailAddress, User, UserId};

#[given(r#"a board owned by "{email}""#)]
fn board_owned_by(world: &mut OrderingWorld, email: String) -> Result<(), eyre::Report> {
    world.seed_columns()?;
    let address = EmailAddress::new(email).wrap_err("parse owner email")?;
    let owner = User::new(UserId::new()).with_email(address);
    world.owner = Some(owner.id());
    world.store.insert_user(owner).wrap_err("seed owner")?;
    Ok(())
}

#[given(r#"the "{column}" column holds the tasks "{titles}""#)]
fn column_holds_tasks(
    world: &mut OrderingWorld,
    column: String,
    titles: String,
) -> Result<(), eyre::Report> {
    world.add_tasks(&column, &titles)
}
