/// Root element naming for serialized output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Root {
    /// Derived from the entity type name.
    #[default]
    TypeName,
    Named(String),
    /// JSON only; XML always has a root element.
    Omitted,
}

/// Where extra methods go relative to the ones the caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodPlacement {
    BeforeCaller,
    AfterCaller,
}

/// Caller-facing serialization options.
///
/// `only` and `except` filter native attributes, `methods` names extra
/// readable values to append after them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SerializeOptions {
    only: Option<Vec<String>>,
    except: Vec<String>,
    methods: Vec<String>,
    root: Root,
}

impl SerializeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn only<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.only
            .get_or_insert_with(Vec::new)
            .extend(names.into_iter().map(Into::into));
        self
    }

    pub fn except(mut self, name: impl Into<String>) -> Self {
        self.except.push(name.into());
        self
    }

    pub fn except_all<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.except.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn method(mut self, name: impl Into<String>) -> Self {
        self.methods.push(name.into());
        self
    }

    pub fn methods<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn root(mut self, name: impl Into<String>) -> Self {
        self.root = Root::Named(name.into());
        self
    }

    pub fn without_root(mut self) -> Self {
        self.root = Root::Omitted;
        self
    }

    pub fn only_names(&self) -> Option<&[String]> {
        self.only.as_deref()
    }

    pub fn except_names(&self) -> &[String] {
        &self.except
    }

    pub fn method_names(&self) -> &[String] {
        &self.methods
    }

    pub fn root_option(&self) -> &Root {
        &self.root
    }

    pub fn excludes(&self, name: &str) -> bool {
        self.except.iter().any(|excluded| excluded == name)
    }

    /// Whether a native attribute passes the `only`/`except` filters.
    pub fn includes_attribute(&self, name: &str) -> bool {
        let listed = self
            .only
            .as_ref()
            .is_none_or(|only| only.iter().any(|included| included == name));
        listed && !self.excludes(name)
    }

    /// Copy of these options with `extra` merged into `methods`.
    ///
    /// Names the caller excluded (or left out of `only`) are dropped, names the
    /// caller already listed keep their position, and nothing the caller set is removed.
    pub fn with_extra_methods(&self, extra: &[String], placement: MethodPlacement) -> Self {
        let extra: Vec<String> = extra
            .iter()
            .filter(|name| self.includes_attribute(name))
            .filter(|name| !self.methods.contains(name))
            .cloned()
            .collect();

        let methods = match placement {
            MethodPlacement::BeforeCaller => extra.into_iter().chain(self.methods.iter().cloned()).collect(),
            MethodPlacement::AfterCaller => self.methods.iter().cloned().chain(extra).collect(),
        };

        Self {
            methods,
            ..self.clone()
        }
    }
}
