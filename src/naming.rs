//! File and folder naming conventions for persisted documents.
//!
//! Actions that operate on the same resource collapse into one document: collection
//! actions (`index`, `store`) share one file and member actions (`show`, `update`,
//! `destroy`) share another, with each HTTP method stored as its own key.

/// Actions that operate on the whole collection
pub const COLLECTION_ACTIONS: [&str; 2] = ["index", "store"];
/// Actions that operate on a single member
pub const MEMBER_ACTIONS: [&str; 3] = ["show", "update", "destroy"];

pub const COLLECTION_FILE_STEM: &str = "get_list_store";
pub const MEMBER_FILE_STEM: &str = "get_one_update_delete";

/// Token removed from controller names when deriving folder names
pub const CONTROLLER_SUFFIX: &str = "Controller";

/// Document file name for an action.
pub fn action_file_name(action: &str) -> String {
    let stem = if COLLECTION_ACTIONS.contains(&action) {
        COLLECTION_FILE_STEM
    } else if MEMBER_ACTIONS.contains(&action) {
        MEMBER_FILE_STEM
    } else {
        action
    };
    format!("{}.json", stem)
}

/// Folder name for a controller: last namespace segment, without the `Controller`
/// token, in snake_case.
pub fn controller_folder_name(controller: &str) -> String {
    let short = last_segment(controller).replace(CONTROLLER_SUFFIX, "");
    snake_case(&short)
}

/// Last segment of a `::` or `\` separated name.
pub fn last_segment(name: &str) -> &str {
    name.rsplit(|c: char| c == '\\' || c == ':')
        .next()
        .unwrap_or(name)
}

/// Converts `StudlyCase` to `snake_case` by inserting `_` before every upper-case
/// letter that follows another character. Whitespace-separated words are capitalized
/// and joined first, so `order items` becomes `order_items`.
pub fn snake_case(value: &str) -> String {
    if value.chars().all(|c| c.is_ascii_lowercase()) {
        return value.to_string();
    }

    let compact: String = value
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect();
    let mut out = String::with_capacity(compact.len() + 4);
    for (i, c) in compact.chars().enumerate() {
        if c.is_uppercase() && i > 0 {
            out.push('_');
        }
        out.extend(c.to_lowercase());
    }
    out
}

/// Ensures an endpoint starts with `/`.
pub fn normalize_endpoint(endpoint: &str) -> String {
    if endpoint.starts_with('/') {
        endpoint.to_string()
    } else {
        format!("/{}", endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_actions_share_file() {
        assert_eq!(action_file_name("index"), "get_list_store.json");
        assert_eq!(action_file_name("store"), "get_list_store.json");
    }

    #[test]
    fn test_member_actions_share_file() {
        assert_eq!(action_file_name("show"), "get_one_update_delete.json");
        assert_eq!(action_file_name("update"), "get_one_update_delete.json");
        assert_eq!(action_file_name("destroy"), "get_one_update_delete.json");
    }

    #[test]
    fn test_custom_action_used_verbatim() {
        assert_eq!(action_file_name("publish"), "publish.json");
        assert_eq!(action_file_name("Index"), "Index.json");
    }

    #[test]
    fn test_controller_folder_name() {
        assert_eq!(
            controller_folder_name("App::Http::Controllers::WidgetController"),
            "widget"
        );
        assert_eq!(
            controller_folder_name("App\\Http\\Controllers\\Admin\\UserProfileController"),
            "user_profile"
        );
        assert_eq!(controller_folder_name("OrderItems"), "order_items");
    }

    #[test]
    fn test_last_segment() {
        assert_eq!(last_segment("App::Http::WidgetController"), "WidgetController");
        assert_eq!(last_segment("App\\WidgetController"), "WidgetController");
        assert_eq!(last_segment("WidgetController"), "WidgetController");
    }

    #[test]
    fn test_snake_case() {
        assert_eq!(snake_case("UserProfile"), "user_profile");
        assert_eq!(snake_case("already_snake"), "already_snake");
        assert_eq!(snake_case("HTTPClient"), "h_t_t_p_client");
        assert_eq!(snake_case("Order Items"), "order_items");
        assert_eq!(snake_case("order items"), "order_items");
        assert_eq!(snake_case("widget"), "widget");
    }

    #[test]
    fn test_normalize_endpoint() {
        assert_eq!(normalize_endpoint("users"), "/users");
        assert_eq!(normalize_endpoint("/users"), "/users");
    }
}
