/// User-facing banner texts of one resource. Raw transport detail never ends
/// up here; it goes to the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceMessages {
    pub load_failed: String,
    pub save_failed: String,
    pub delete_failed: String,
}

impl ResourceMessages {
    /// Messages derived from the singular and plural resource labels,
    /// e.g. `("project", "projects")`.
    pub fn for_labels(singular: &str, plural: &str) -> Self {
        Self {
            load_failed: format!("Unable to load {plural}. Please try again later."),
            save_failed: format!("Unable to save the {singular}. Please check the data."),
            delete_failed: format!("Unable to delete the {singular}. Please try again later."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn derived_from_labels() {
        let m = ResourceMessages::for_labels("project", "projects");
        assert_eq!(m.load_failed, "Unable to load projects. Please try again later.");
        assert_eq!(m.save_failed, "Unable to save the project. Please check the data.");
        assert_eq!(m.delete_failed, "Unable to delete the project. Please try again later.");
    }
}
