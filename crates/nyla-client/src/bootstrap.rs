/// Attribute of the embedding script element that carries the site identifier.
pub const SITE_ID_ATTRIBUTE: &str = "data-siteid";

/// Finds a non-empty `data-siteid` among the script element's attributes.
pub fn site_from_attributes<'a, I>(attributes: I) -> Option<String>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    attributes
        .into_iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(SITE_ID_ATTRIBUTE))
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
