use wearvote_types::models::User;

use crate::document::Document;

/// Demo roster written when no document exists yet. User 1 is the default
/// primary user that synthetic activity targets.
const SEED_USERS: &[(&str, &str, u64)] = &[
    ("Deniz Arslan", "Minimal looks, maximal coffee", 2423),
    ("Mara Quinn", "Thrift hunter and vintage denim hoarder", 1810),
    ("Jonah Reyes", "Street style from the corner of 5th", 932),
    ("Ilse Varga", "Office fits that survive the commute", 1275),
    ("Kofi Mensah", "Sneakers first, questions later", 3104),
    ("Lena Brandt", "Monochrome everything", 688),
    ("Tomas Ortega", "Tailoring on a budget", 451),
    ("Ayla Demir", "Color theory in real life", 1999),
];

pub(crate) fn document() -> Document {
    let users = SEED_USERS
        .iter()
        .zip(1u64..)
        .map(|(&(name, bio, followers), id)| User {
            id,
            name: name.to_string(),
            avatar: format!("https://i.pravatar.cc/150?u={id}"),
            bio: bio.to_string(),
            followers,
        })
        .collect();

    Document {
        users,
        ..Document::default()
    }
}
