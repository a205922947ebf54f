use serde::Deserialize;

// GitHub API response structures, only the fields the export reads
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubUser {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRepo {
    pub name: String,
    pub html_url: String,
}
