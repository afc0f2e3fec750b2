//! Root welcome message and the OpenAPI document.

use axum::Json;

use crate::config::APP_VERSION;

/// `GET /` — welcome message pointing at the docs.
pub async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Welcome to the Shopsense product recommendation API. See /openapi.json for the surface."
    }))
}

/// `GET /openapi.json` — OpenAPI 3.0 description of the service.
pub async fn openapi() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "openapi": "3.0.0",
        "info": {
            "title": "Shopsense API",
            "version": APP_VERSION,
            "description": "Product recommendations from text queries, handwritten-note OCR, and product photos"
        },
        "paths": {
            "/health": {
                "get": {
                    "summary": "Check API health",
                    "responses": {
                        "200": {"description": "All collaborators reachable"},
                        "503": {"description": "Vector index unreachable"}
                    }
                }
            },
            "/recommend": {
                "post": {
                    "summary": "Get product recommendations from text",
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": {
                                    "type": "object",
                                    "properties": {"query": {"type": "string"}},
                                    "example": {"query": "red alarm clock"}
                                }
                            }
                        }
                    },
                    "responses": {"200": {"description": "List of recommended products"}}
                }
            },
            "/recommend-ocr": {
                "post": {
                    "summary": "Search products using an image of text",
                    "requestBody": {
                        "content": {
                            "multipart/form-data": {
                                "schema": {
                                    "type": "object",
                                    "properties": {"image": {"type": "string", "format": "binary"}}
                                }
                            }
                        }
                    },
                    "responses": {"200": {"description": "OCR text and recommendations"}}
                }
            },
            "/detect-product": {
                "post": {
                    "summary": "Identify a product from a photo",
                    "requestBody": {
                        "content": {
                            "multipart/form-data": {
                                "schema": {
                                    "type": "object",
                                    "properties": {"image": {"type": "string", "format": "binary"}}
                                }
                            }
                        }
                    },
                    "responses": {"200": {"description": "Identified product and similar items"}}
                }
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn openapi_document_lists_all_routes() {
        let Json(doc) = openapi().await;
        let paths = doc["paths"].as_object().unwrap();
        for route in ["/health", "/recommend", "/recommend-ocr", "/detect-product"] {
            assert!(paths.contains_key(route), "missing {route}");
        }
        assert_eq!(doc["openapi"], "3.0.0");
        assert_eq!(doc["info"]["version"], APP_VERSION);
    }

    #[tokio::test]
    async fn root_is_a_welcome_message() {
        let Json(body) = root().await;
        assert!(body["message"].as_str().unwrap().contains("Shopsense"));
    }
}
