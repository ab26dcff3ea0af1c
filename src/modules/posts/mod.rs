pub mod models;
pub mod repository;
pub mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use inkwell_kernel::{InitCtx, Module};
use serde_json::json;

use models::{CONTENT_MAX_CHARS, TITLE_MAX_CHARS};
use repository::SharedPostRepository;

/// Posts module: CRUD over the posts collection
pub struct PostsModule {
    repository: SharedPostRepository,
}

impl PostsModule {
    pub fn new(repository: SharedPostRepository) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl Module for PostsModule {
    fn name(&self) -> &'static str {
        "posts"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            backend = ?ctx.settings.database.backend,
            collection = %ctx.settings.database.collection,
            "posts module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(Arc::clone(&self.repository))
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi_fragment())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "posts module stopped");
        Ok(())
    }
}

fn error_response(description: &str) -> serde_json::Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        }
    })
}

fn post_response(description: &str) -> serde_json::Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/Post" }
            }
        }
    })
}

fn json_body(schema: &str) -> serde_json::Value {
    json!({
        "required": true,
        "content": {
            "application/json": {
                "schema": { "$ref": format!("#/components/schemas/{}", schema) }
            }
        }
    })
}

fn id_parameter() -> serde_json::Value {
    json!({
        "name": "id",
        "in": "path",
        "required": true,
        "description": "Post identifier (24 hex characters)",
        "schema": { "type": "string" }
    })
}

fn openapi_fragment() -> serde_json::Value {
    json!({
        "paths": {
            "/": {
                "get": {
                    "summary": "List posts, optionally filtered by title",
                    "tags": ["Posts"],
                    "parameters": [{
                        "name": "title",
                        "in": "query",
                        "required": false,
                        "description": "Case-insensitive fragment the title must contain",
                        "schema": { "type": "string" }
                    }],
                    "responses": {
                        "200": {
                            "description": "Posts in creation order",
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "array",
                                        "items": { "$ref": "#/components/schemas/Post" }
                                    }
                                }
                            }
                        },
                        "500": error_response("Internal server error")
                    }
                },
                "post": {
                    "summary": "Create a post",
                    "tags": ["Posts"],
                    "requestBody": json_body("PostCreate"),
                    "responses": {
                        "201": post_response("Created post"),
                        "400": error_response("Malformed JSON"),
                        "415": error_response("Missing JSON content type"),
                        "422": error_response("Validation error"),
                        "500": error_response("Internal server error")
                    }
                }
            },
            "/health": {
                "get": {
                    "summary": "Posts health check",
                    "tags": ["Posts"],
                    "responses": {
                        "200": {
                            "description": "OK",
                            "content": {
                                "text/plain": { "schema": { "type": "string" } }
                            }
                        }
                    }
                }
            },
            "/{id}": {
                "get": {
                    "summary": "Fetch a post",
                    "tags": ["Posts"],
                    "parameters": [id_parameter()],
                    "responses": {
                        "200": post_response("The post"),
                        "404": error_response("Post not found"),
                        "500": error_response("Internal server error")
                    }
                },
                "put": {
                    "summary": "Replace a post's title and content",
                    "tags": ["Posts"],
                    "parameters": [id_parameter()],
                    "requestBody": json_body("PostCreate"),
                    "responses": {
                        "200": post_response("Updated post"),
                        "404": error_response("Post not found"),
                        "422": error_response("Validation error"),
                        "500": error_response("Internal server error")
                    }
                },
                "patch": {
                    "summary": "Update only the supplied fields of a post",
                    "tags": ["Posts"],
                    "parameters": [id_parameter()],
                    "requestBody": json_body("PostPatch"),
                    "responses": {
                        "200": post_response("Updated post"),
                        "404": error_response("Post not found"),
                        "422": error_response("Validation error"),
                        "500": error_response("Internal server error")
                    }
                },
                "delete": {
                    "summary": "Delete a post",
                    "tags": ["Posts"],
                    "parameters": [id_parameter()],
                    "responses": {
                        "200": {
                            "description": "Post deleted",
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/Deleted" }
                                }
                            }
                        },
                        "404": error_response("Post not found"),
                        "500": error_response("Internal server error")
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Post": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "string", "description": "Identifier assigned on creation" },
                        "title": { "type": "string" },
                        "content": { "type": "string" },
                        "created": { "type": "string", "format": "date-time" }
                    },
                    "required": ["id", "title", "content", "created"]
                },
                "PostCreate": {
                    "type": "object",
                    "properties": {
                        "title": { "type": "string", "minLength": 1, "maxLength": TITLE_MAX_CHARS },
                        "content": { "type": "string", "minLength": 1, "maxLength": CONTENT_MAX_CHARS }
                    },
                    "required": ["title", "content"]
                },
                "PostPatch": {
                    "type": "object",
                    "properties": {
                        "title": { "type": "string", "minLength": 1, "maxLength": TITLE_MAX_CHARS },
                        "content": { "type": "string", "minLength": 1, "maxLength": CONTENT_MAX_CHARS }
                    }
                },
                "Deleted": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "string" },
                        "message": { "type": "string" }
                    },
                    "required": ["id", "message"]
                }
            }
        }
    })
}

/// Create the posts module around an already constructed repository
pub fn create_module(repository: SharedPostRepository) -> Arc<dyn Module> {
    Arc::new(PostsModule::new(repository))
}
