use alloc::{boxed::Box, collections::BTreeMap, vec::Vec};

struct Entry {
    points: u32,
    /// Position among all players by the time of their first point.
    first: usize,
}

/// Points per player of a quiz.
#[derive(Default)]
pub struct Scoreboard {
    entries: BTreeMap<Box<str>, Entry>,
}

impl Scoreboard {
    pub fn credit(&mut self, user: &str) {
        if let Some(entry) = self.entries.get_mut(user) {
            entry.points += 1;
            return;
        }
        let first = self.entries.len();
        self.entries.insert(user.into(), Entry { points: 1, first });
    }

    pub fn points(&self, user: &str) -> u32 {
        self.entries.get(user).map_or(0, |entry| entry.points)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Players by descending score. Ties go to whoever scored first.
    pub fn ranking(&self) -> Vec<(&str, u32)> {
        let mut entries: Vec<_> = self.entries.iter().collect();
        entries.sort_by(|(_, a), (_, b)| b.points.cmp(&a.points).then(a.first.cmp(&b.first)));
        entries.into_iter().map(|(user, entry)| (user.as_ref(), entry.points)).collect()
    }
}
