use serde::Serialize;
use sqlx::FromRow;

use crate::{
    binder::{Bindable, Field, Rule},
    id::RecordId,
};

/// Contact record, always owned by one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, FromRow)]
pub struct Contact {
    pub id: RecordId,
    #[serde(skip)]
    pub user_id: RecordId,
    pub avatar: String,
    pub first: String,
    pub last: String,
    pub twitter: String,
    pub favorite: bool,
}

const CONTACT_FIELDS: &[Field<Contact>] = &[
    Field::identifier("id"),
    Field::string(
        "avatar",
        false,
        |c: &Contact| c.avatar.as_str(),
        |c: &mut Contact, v| c.avatar = v,
        &[Rule::Url],
    ),
    Field::string(
        "first",
        true,
        |c: &Contact| c.first.as_str(),
        |c: &mut Contact, v| c.first = v,
        &[Rule::Required, Rule::MinLen(3)],
    ),
    Field::string(
        "last",
        true,
        |c: &Contact| c.last.as_str(),
        |c: &mut Contact, v| c.last = v,
        &[Rule::Required],
    ),
    Field::string(
        "twitter",
        false,
        |c: &Contact| c.twitter.as_str(),
        |c: &mut Contact, v| c.twitter = v,
        &[],
    ),
    Field::boolean("favorite", |c: &mut Contact, v| c.favorite = v),
];

impl Bindable for Contact {
    fn fields() -> &'static [Field<Self>] {
        CONTACT_FIELDS
    }
}
