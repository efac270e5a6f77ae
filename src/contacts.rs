use crate::models::{ContactSort, EmergencyContact, NewContact};
use uuid::Uuid;

/// Mutable directory of emergency contacts.
///
/// Invariant: at most one contact is primary. `add` on an empty directory and
/// `set_primary` both enforce it; deleting the primary promotes the first
/// remaining contact so a non-empty directory never ends up without one.
#[derive(Debug, Default)]
pub struct ContactDirectory {
    contacts: Vec<EmergencyContact>,
}

impl ContactDirectory {
    pub fn from_records(contacts: Vec<EmergencyContact>) -> Self {
        Self { contacts }
    }

    pub fn records(&self) -> &[EmergencyContact] {
        &self.contacts
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn primary(&self) -> Option<&EmergencyContact> {
        self.contacts.iter().find(|contact| contact.is_primary)
    }

    /// Assigns a fresh id and appends the contact. The first contact added to
    /// an empty directory is forced primary regardless of the caller's value;
    /// a later add marked primary demotes the current one.
    pub fn add(&mut self, new_contact: NewContact) -> EmergencyContact {
        let is_primary = self.contacts.is_empty() || new_contact.is_primary;
        if is_primary {
            for existing in &mut self.contacts {
                existing.is_primary = false;
            }
        }
        let contact = EmergencyContact {
            id: Uuid::new_v4().to_string(),
            name: new_contact.name,
            phone: new_contact.phone,
            relation: new_contact.relation,
            is_primary,
            icon: new_contact.icon,
        };
        self.contacts.push(contact.clone());
        contact
    }

    /// Removes the contact, promoting the first remaining contact when the
    /// primary is deleted.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.contacts.len();
        self.contacts.retain(|contact| contact.id != id);
        if self.contacts.len() == before {
            return false;
        }
        if self.primary().is_none() {
            if let Some(first) = self.contacts.first_mut() {
                first.is_primary = true;
            }
        }
        true
    }

    /// Marks the matching contact primary and clears the flag on every other
    /// contact in one pass. Unknown ids leave the directory unchanged but
    /// still count as a rewrite for the caller.
    pub fn set_primary(&mut self, id: &str) -> bool {
        if !self.contacts.iter().any(|contact| contact.id == id) {
            return false;
        }
        for contact in &mut self.contacts {
            contact.is_primary = contact.id == id;
        }
        true
    }

    /// Case-insensitive substring match over name, phone and relation.
    /// Order-preserving; the stored order is untouched.
    pub fn filter(&self, query: &str) -> Vec<EmergencyContact> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.contacts.clone();
        }
        self.contacts
            .iter()
            .filter(|contact| {
                contact.name.to_lowercase().contains(&needle)
                    || contact.phone.to_lowercase().contains(&needle)
                    || contact.relation.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }

    /// Pure sorted projection of `contacts`; never mutates stored order.
    pub fn sorted(&self, contacts: Vec<EmergencyContact>, sort: ContactSort) -> Vec<EmergencyContact> {
        let mut result = contacts;
        match sort {
            ContactSort::Primary => {
                result.sort_by(|a, b| {
                    b.is_primary
                        .cmp(&a.is_primary)
                        .then_with(|| compare_names(&a.name, &b.name))
                });
            }
            ContactSort::Name => {
                result.sort_by(|a, b| compare_names(&a.name, &b.name));
            }
        }
        result
    }
}

// Case-folded comparison as a stand-in for a locale collator.
fn compare_names(a: &str, b: &str) -> std::cmp::Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::ContactDirectory;
    use crate::models::{ContactSort, NewContact};

    fn new_contact(name: &str, phone: &str, relation: &str, is_primary: bool) -> NewContact {
        NewContact {
            name: name.to_string(),
            phone: phone.to_string(),
            relation: relation.to_string(),
            is_primary,
            icon: None,
        }
    }

    #[test]
    fn first_contact_is_forced_primary() {
        let mut directory = ContactDirectory::default();
        let ana = directory.add(new_contact("Ana", "111", "Mãe", false));
        assert!(ana.is_primary);
        assert_eq!(directory.primary().map(|c| c.id.clone()), Some(ana.id));
    }

    #[test]
    fn set_primary_leaves_exactly_one_primary() {
        let mut directory = ContactDirectory::default();
        let ana = directory.add(new_contact("Ana", "111", "Mãe", true));
        let bruno = directory.add(new_contact("Bruno", "222", "Vizinho", false));

        assert!(directory.set_primary(&bruno.id));
        let primaries: Vec<_> = directory
            .records()
            .iter()
            .filter(|contact| contact.is_primary)
            .collect();
        assert_eq!(primaries.len(), 1);
        assert_eq!(primaries[0].id, bruno.id);
        assert!(!directory
            .records()
            .iter()
            .find(|contact| contact.id == ana.id)
            .expect("ana")
            .is_primary);
    }

    #[test]
    fn set_primary_on_unknown_id_changes_nothing() {
        let mut directory = ContactDirectory::default();
        let ana = directory.add(new_contact("Ana", "111", "Mãe", false));
        assert!(!directory.set_primary("missing"));
        assert_eq!(directory.primary().map(|c| c.id.clone()), Some(ana.id));
    }

    #[test]
    fn deleting_the_primary_promotes_the_first_remaining() {
        let mut directory = ContactDirectory::default();
        let ana = directory.add(new_contact("Ana", "111", "Mãe", false));
        let bruno = directory.add(new_contact("Bruno", "222", "Vizinho", false));
        directory.add(new_contact("Carla", "333", "Cuidadora", false));

        assert!(directory.delete(&ana.id));
        assert_eq!(directory.primary().map(|c| c.id.clone()), Some(bruno.id));
        assert_eq!(
            directory
                .records()
                .iter()
                .filter(|contact| contact.is_primary)
                .count(),
            1
        );
    }

    #[test]
    fn filter_is_order_preserving_and_case_insensitive() {
        let mut directory = ContactDirectory::default();
        directory.add(new_contact("Ana Souza", "111", "Mãe", false));
        directory.add(new_contact("Bruno", "222", "vizinho", false));
        directory.add(new_contact("Mariana", "333", "Cuidadora", false));

        let hits = directory.filter("AN");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].name, "Ana Souza");
        assert_eq!(hits[1].name, "Mariana");

        assert!(directory.filter("zzz").is_empty());

        let by_phone = directory.filter("222");
        assert_eq!(by_phone.len(), 1);
        assert_eq!(by_phone[0].name, "Bruno");
    }

    #[test]
    fn sorting_is_a_projection_over_insertion_order() {
        let mut directory = ContactDirectory::default();
        directory.add(new_contact("Carla", "333", "Cuidadora", false));
        let bruno = directory.add(new_contact("bruno", "222", "Vizinho", false));
        directory.add(new_contact("Ana", "111", "Mãe", false));
        directory.set_primary(&bruno.id);

        let by_primary = directory.sorted(directory.records().to_vec(), ContactSort::Primary);
        assert_eq!(by_primary[0].name, "bruno");
        assert_eq!(by_primary[1].name, "Ana");
        assert_eq!(by_primary[2].name, "Carla");

        let by_name = directory.sorted(directory.records().to_vec(), ContactSort::Name);
        assert_eq!(by_name[0].name, "Ana");
        assert_eq!(by_name[1].name, "bruno");
        assert_eq!(by_name[2].name, "Carla");

        // stored order untouched
        assert_eq!(directory.records()[0].name, "Carla");
    }
}
