use crate::models::RecordQuery;

/// WHERE clause and bind parameters for a listing query
///
/// The clause is empty when nothing filters the listing; otherwise it starts
/// with " WHERE ". Parameters are bound in order with `?` placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchClause {
    pub where_clause: String,
    pub parameters: Vec<String>,
}

impl SearchClause {
    /// Build the clause for a record listing
    ///
    /// `search_columns` are matched case-insensitively against the search
    /// term as a substring; `major_column` is set only for students.
    pub fn build(query: &RecordQuery, search_columns: &[&str], major_column: Option<&str>) -> Self {
        let mut conditions = Vec::new();
        let mut parameters = Vec::new();

        if let Some(term) = query.search_term() {
            let pattern = like_pattern(term);
            let matches: Vec<String> = search_columns
                .iter()
                .map(|column| format!("LOWER({}) LIKE ? ESCAPE '\\'", column))
                .collect();
            if !matches.is_empty() {
                conditions.push(format!("({})", matches.join(" OR ")));
                parameters.extend(std::iter::repeat(pattern).take(matches.len()));
            }
        }

        if let (Some(column), Some(major)) = (major_column, query.major) {
            conditions.push(format!("{} = ?", column));
            parameters.push(major.label().to_string());
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        Self {
            where_clause,
            parameters,
        }
    }
}

/// Lowercased `%term%` pattern with LIKE wildcards escaped
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}
