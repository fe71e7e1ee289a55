use crate::domain::model::Breed;
use std::collections::HashSet;

/// De-duplicates breed names, keeping first-seen order.
pub fn breed_options<I, S>(names: I) -> Vec<Breed>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut seen = HashSet::new();
    let mut options = Vec::new();

    for name in names {
        let name: String = name.into();
        if seen.insert(name.clone()) {
            options.push(Breed::new(name));
        }
    }

    options
}
