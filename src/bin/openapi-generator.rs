//! Print the OpenAPI document to stdout for CI artifacts.

use predict_people_back::services::documentation::ApiDoc;
use utoipa::OpenApi;

fn main() {
    let doc = ApiDoc::openapi();
    match doc.to_pretty_json() {
        Ok(json) => println!("{json}"),
        Err(err) => {
            eprintln!("failed to serialize OpenAPI document: {err}");
            std::process::exit(1);
        }
    }
}
