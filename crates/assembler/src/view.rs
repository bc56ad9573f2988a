//! View-variant resolution.
//!
//! A site is written once with a canonical prefix in some names (for example
//! `MainContent`). A request may carry a view such as `Alt`; names containing
//! the prefix are then tried with the prefix swapped for the view first
//! (`AltContent`), falling back to the canonical name.

use assembler_tags::replace_first_ci;

#[derive(Debug, Clone, Copy)]
pub struct ViewResolver<'a> {
    prefix: &'a str,
    view: Option<&'a str>,
}

impl<'a> ViewResolver<'a> {
    pub fn new(prefix: &'a str, view: Option<&'a str>) -> Self {
        Self { prefix, view }
    }

    /// Both a prefix and a non-empty view are required.
    pub fn is_active(&self) -> bool {
        !self.prefix.is_empty() && self.view.is_some_and(|v| !v.is_empty())
    }

    /// `name` with the first occurrence of the prefix (ignoring ASCII case)
    /// replaced by the view, if that applies.
    ///
    /// ```rust
    /// use assembler::ViewResolver;
    ///
    /// let views = ViewResolver::new("Main", Some("Alt"));
    /// assert_eq!(views.variant_name("MainContent").as_deref(), Some("AltContent"));
    /// assert_eq!(views.variant_name("Header"), None);
    /// ```
    pub fn variant_name(&self, name: &str) -> Option<String> {
        let view = self.view.filter(|_| self.is_active())?;
        replace_first_ci(name, self.prefix, view)
    }

    /// Looks `name` up through the variant first, then as written.
    pub fn resolve<T>(&self, name: &str, mut lookup: impl FnMut(&str) -> Option<T>) -> Option<T> {
        if let Some(found) = self.variant_name(name).and_then(|variant| lookup(&variant)) {
            return Some(found);
        }
        lookup(name)
    }
}
