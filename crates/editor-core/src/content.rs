//! Business profile flattening.

use posterkit_layer_model::content::{fields, BusinessProfile, ContentMap};

/// Separator placed between services in the tag-line.
pub const SERVICES_SEPARATOR: &str = " • ";

/// Flatten a business profile into field-keyed content.
///
/// Total and pure: each present, non-blank profile field yields exactly one
/// entry (trimmed); absent or blank fields yield nothing. Services are
/// joined into a single tag-line.
pub fn map_profile_to_content(profile: &BusinessProfile) -> ContentMap {
    let mut content = ContentMap::new();

    let scalar_fields = [
        (fields::COMPANY_NAME, &profile.name),
        (fields::PHONE, &profile.phone),
        (fields::EMAIL, &profile.email),
        (fields::WEBSITE, &profile.website),
        (fields::ADDRESS, &profile.address),
        (fields::CATEGORY, &profile.category),
        (fields::LOGO, &profile.logo),
    ];
    for (key, value) in scalar_fields {
        if let Some(text) = non_blank(value.as_deref()) {
            content.insert(key, text);
        }
    }

    let services: Vec<&str> = profile
        .services
        .iter()
        .filter_map(|s| non_blank(Some(s.as_str())))
        .collect();
    if !services.is_empty() {
        content.insert(fields::SERVICES, services.join(SERVICES_SEPARATOR));
    }

    content
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_and_phone_only() {
        let profile = BusinessProfile {
            name: Some("Acme Co".to_string()),
            phone: Some("555-1234".to_string()),
            ..Default::default()
        };
        let content = map_profile_to_content(&profile);
        assert_eq!(content.len(), 2);
        assert_eq!(content.get(fields::COMPANY_NAME), Some("Acme Co"));
        assert_eq!(content.get(fields::PHONE), Some("555-1234"));
    }

    #[test]
    fn test_blank_values_are_omitted() {
        let profile = BusinessProfile {
            name: Some("   ".to_string()),
            email: Some(String::new()),
            services: vec![" ".to_string()],
            ..Default::default()
        };
        assert!(map_profile_to_content(&profile).is_empty());
    }

    #[test]
    fn test_services_join_into_tagline() {
        let profile = BusinessProfile {
            services: vec!["Haircuts".to_string(), "".to_string(), " Coloring ".to_string()],
            ..Default::default()
        };
        let content = map_profile_to_content(&profile);
        assert_eq!(content.get(fields::SERVICES), Some("Haircuts • Coloring"));
    }

    #[test]
    fn test_full_profile_maps_every_field() {
        let profile = BusinessProfile {
            name: Some("Acme Co".to_string()),
            phone: Some("555-1234".to_string()),
            email: Some("hi@acme.test".to_string()),
            website: Some("acme.test".to_string()),
            address: Some("1 Main St".to_string()),
            category: Some("Bakery".to_string()),
            services: vec!["Cakes".to_string()],
            logo: Some("https://cdn.acme.test/logo.png".to_string()),
        };
        let content = map_profile_to_content(&profile);
        assert_eq!(content.len(), 8);
        assert!(content.iter().all(|(_, v)| v != "undefined" && !v.is_empty()));
    }
}
