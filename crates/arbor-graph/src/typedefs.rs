//! Core type declarations for the demo publishing domain.

use crate::schema::TypeDecl;

/// The core type declarations.
///
/// Plugins extend these via the `register_typedefs` extension point;
/// repeating a type name adds fields to it.
pub fn core_typedefs() -> Vec<TypeDecl> {
    vec![
        TypeDecl::object("Query", &["date", "posts", "author", "content"]),
        TypeDecl::object("Mutation", &["upvotePost"]),
        TypeDecl::object("Author", &["id", "firstName", "lastName", "posts"]),
        TypeDecl::object("Post", &["id", "title", "author", "votes"]),
        TypeDecl::interface("Content", &["id", "title"]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolvers::core_resolvers;
    use crate::schema::Schema;

    #[test]
    fn test_core_schema_builds() {
        let schema = Schema::builder()
            .decls(core_typedefs())
            .resolvers(core_resolvers())
            .build()
            .unwrap();
        assert!(schema.has_field("Query", "posts"));
        assert!(schema.has_field("Post", "votes"));
        assert!(schema.type_def("Content").unwrap().is_interface());
    }
}
