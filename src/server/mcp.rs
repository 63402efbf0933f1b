use crate::app::dto::*;
use crate::app::engine::DiagramEngine;
use rmcp::{
    Json, ServerHandler, ServiceExt, handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters, model::*, tool, tool_handler, tool_router,
    transport::stdio,
};
use tokio::task::spawn_blocking;

#[derive(Clone)]
pub struct DiagramMcpServer {
    engine: DiagramEngine,
    tool_router: ToolRouter<Self>,
}

impl DiagramMcpServer {
    pub fn new(engine: DiagramEngine) -> Self {
        Self {
            engine,
            tool_router: Self::tool_router(),
        }
    }

    pub async fn serve_stdio(self) -> anyhow::Result<()> {
        let service = self.serve(stdio()).await?;
        service.waiting().await?;
        Ok(())
    }
}

#[tool_router]
impl DiagramMcpServer {
    #[tool(
        description = "Render a class diagram (classDiagrams) or entity-relationship diagram (ermDiagrams) as PlantUML text."
    )]
    async fn render_diagram(
        &self,
        params: Parameters<RenderJob>,
    ) -> Result<Json<RenderResponse>, String> {
        let engine = self.engine.clone();
        let job = params.0;
        spawn_blocking(move || engine.render(&job))
            .await
            .map_err(|e| format!("task join error: {e}"))?
            .map(Json)
            .map_err(|e| format!("{e:#}"))
    }

    #[tool(description = "Report the loaded type universe.")]
    async fn health(&self) -> Result<Json<HealthResponse>, String> {
        self.engine.health().map(Json).map_err(|e| e.to_string())
    }
}

#[tool_handler]
impl ServerHandler for DiagramMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Render PlantUML class and entity-relationship diagrams from a loaded type universe."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{DeclaredKind, TypeDescriptor, TypeUniverse};

    #[tokio::test]
    async fn test_mcp_tools_smoke() {
        let mut seat = TypeDescriptor::new("shop.Seat", DeclaredKind::Class);
        seat.origin = Some("file:/repo/shop/target/classes/shop/Seat.class".into());
        let engine = DiagramEngine::from_universe(TypeUniverse {
            project_root: None,
            types: vec![seat],
        });
        let server = DiagramMcpServer::new(engine);

        let health = server.health().await.unwrap().0;
        assert_eq!(health.type_count, 1);

        let rendered = server
            .render_diagram(Parameters(RenderJob::entity(DiagramParams {
                classes_to_analyze: vec!["shop.Seat".into()],
                ..Default::default()
            })))
            .await
            .unwrap()
            .0;
        assert_eq!(rendered.kind, "erm");
        assert!(rendered.diagram.contains("class shop.Seat <<data>> #afa"));

        let err = server
            .render_diagram(Parameters(RenderJob::default()))
            .await
            .err()
            .expect("render_diagram should fail for an empty job");
        assert!(err.contains("classDiagrams"));
    }
}
