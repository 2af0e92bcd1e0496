//! MCP Server for loan-desk
//!
//! MCP Protocol (stdio) <-> application::LoanDesk
//!
//! 5 tools: book_register, lend, return_book, loan_status, due_date

use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use rmcp::{
    handler::server::{tool::ToolCallContext, tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolRequestParams, CallToolResult, Content, Implementation, ListToolsResult,
        PaginatedRequestParams, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
    transport::stdio,
    ErrorData as McpError, ServerHandler, ServiceExt,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::application::error::AppError;
use crate::application::receipt::{format_date, render_receipt};
use crate::application::service::LoanDesk;
use crate::domain::model::book::Book;
use crate::domain::model::id::Isbn;
use crate::domain::policy;
use crate::infra::json_store::JsonLibraryStore;

// =============================================================================
// Public entry point
// =============================================================================

/// MCP Serverを起動する。store_pathは蔵書と貸出台帳を保持するJSONファイル。
pub async fn run(store_path: PathBuf) -> anyhow::Result<()> {
    let server = LoanDeskMcpServer::new(store_path);
    let service = server.serve(stdio()).await?;
    service.waiting().await?;
    Ok(())
}

// =============================================================================
// MCP Server
// =============================================================================

#[derive(Clone)]
struct LoanDeskMcpServer {
    store: JsonLibraryStore,
    tool_router: ToolRouter<Self>,
}

type Desk = LoanDesk<JsonLibraryStore, JsonLibraryStore>;

impl LoanDeskMcpServer {
    fn new(store_path: PathBuf) -> Self {
        Self {
            store: JsonLibraryStore::new(store_path),
            tool_router: Self::tool_router(),
        }
    }

    /// 共有ストアの上にLoanDeskを組み立てる。ロックはclone間で共有される。
    fn desk(&self) -> Desk {
        LoanDesk::new(self.store.clone(), self.store.clone())
    }

    /// 貸出拒否はツール実行エラーとして返し、それ以外はMcpErrorにする。
    fn to_tool_result(e: AppError) -> Result<CallToolResult, McpError> {
        match e.rejection() {
            Some(rejection) => Ok(CallToolResult::error(vec![Content::text(format!(
                "Refused: {}",
                rejection.message()
            ))])),
            None => Err(Self::to_mcp_error(e)),
        }
    }

    fn to_mcp_error(e: AppError) -> McpError {
        match e {
            AppError::BookNotFound(_)
            | AppError::DuplicateBook(_)
            | AppError::NoActiveLoan(_)
            | AppError::InvalidReturnDate { .. } => {
                McpError::invalid_params(format!("{e}"), None)
            }
            _ => McpError::internal_error(format!("{e}"), None),
        }
    }
}

// =============================================================================
// ServerHandler impl
// =============================================================================

impl ServerHandler for LoanDeskMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "loan-desk".to_string(),
                title: Some("Loan Desk — Library Lending Rules".to_string()),
                description: Some(
                    "Decides whether a book may be lent and computes its return date."
                        .to_string(),
                ),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Lend books from the library catalog.\n\
                 \n\
                 Register books with `book_register`, then `lend` them to a borrower. \
                 Books already on loan and books with palindromic identifiers are refused. \
                 `due_date` previews the return date for any start date; \
                 `loan_status` and `return_book` manage existing loans."
                    .to_string(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: self.tool_router.list_all(),
            next_cursor: None,
            meta: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let tool_ctx = ToolCallContext::new(self, request, context);
        self.tool_router.call(tool_ctx).await
    }
}

// =============================================================================
// Request types
// =============================================================================

/// ISBNが空でないことを検証する。中身の正規化はしない。
fn parse_isbn(raw: &str) -> Result<Isbn, McpError> {
    if raw.is_empty() {
        return Err(McpError::invalid_params("isbn must not be empty", None));
    }
    Ok(Isbn::new(raw))
}

/// `YYYY-MM-DD` を日付に変換する。省略時は本日。
fn parse_date(raw: Option<&str>) -> Result<NaiveDate, McpError> {
    match raw {
        None => Ok(Local::now().date_naive()),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
            McpError::invalid_params(format!("Invalid date: '{s}'. Use YYYY-MM-DD"), None)
        }),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct McpBookRegisterRequest {
    #[schemars(description = "Library identifier code (ISBN). Used as-is, no normalization.")]
    pub isbn: String,
    #[schemars(description = "Book title")]
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct McpLendRequest {
    #[schemars(description = "Identifier of a registered book")]
    pub isbn: String,
    #[schemars(description = "Borrower name")]
    pub borrower: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct McpReturnRequest {
    #[schemars(description = "Identifier of the book being returned")]
    pub isbn: String,
    #[schemars(description = "Return date (YYYY-MM-DD). Default: today.")]
    pub returned_on: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct McpLoanStatusRequest {
    #[schemars(description = "Book identifier")]
    pub isbn: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct McpDueDateRequest {
    #[schemars(description = "Book identifier")]
    pub isbn: String,
    #[schemars(description = "Loan start date (YYYY-MM-DD). Default: today.")]
    pub start_date: Option<String>,
}

// =============================================================================
// Tool implementations
// =============================================================================

#[tool_router]
impl LoanDeskMcpServer {
    #[tool(
        name = "book_register",
        description = "Register a book in the catalog. Identifiers must be unique.",
        annotations(
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = false,
            open_world_hint = false
        )
    )]
    async fn book_register(
        &self,
        Parameters(req): Parameters<McpBookRegisterRequest>,
    ) -> Result<CallToolResult, McpError> {
        let isbn = parse_isbn(&req.isbn)?;
        let book = Book::new(isbn, req.title);
        let summary = format!("Registered: {} ({})", book.title(), book.isbn());
        self.desk()
            .register_book(book)
            .map_err(Self::to_mcp_error)?;

        Ok(CallToolResult::success(vec![Content::text(summary)]))
    }

    #[tool(
        name = "lend",
        description = "Lend a book to a borrower starting today. Refused when the book is already on loan or its identifier is a palindrome (on-site use only). Returns a receipt with the return date.",
        annotations(
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = false,
            open_world_hint = false
        )
    )]
    async fn lend(
        &self,
        Parameters(req): Parameters<McpLendRequest>,
    ) -> Result<CallToolResult, McpError> {
        let isbn = parse_isbn(&req.isbn)?;
        match self.desk().lend(&isbn, &req.borrower) {
            Ok(loan) => Ok(CallToolResult::success(vec![Content::text(
                render_receipt(&loan),
            )])),
            Err(e) => Self::to_tool_result(e),
        }
    }

    #[tool(
        name = "return_book",
        description = "Record the return of a book on loan, making it available again.",
        annotations(
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = false,
            open_world_hint = false
        )
    )]
    async fn return_book(
        &self,
        Parameters(req): Parameters<McpReturnRequest>,
    ) -> Result<CallToolResult, McpError> {
        let isbn = parse_isbn(&req.isbn)?;
        let returned_on = parse_date(req.returned_on.as_deref())?;
        let loan = self
            .desk()
            .return_book(&isbn, returned_on)
            .map_err(Self::to_mcp_error)?;

        Ok(CallToolResult::success(vec![Content::text(format!(
            "Returned: {} ({}) by {} on {} [loan {}]",
            loan.book().title(),
            isbn,
            loan.borrower(),
            format_date(returned_on),
            loan.id().short()
        ))]))
    }

    #[tool(
        name = "loan_status",
        description = "Show whether a book is on loan, whether it is restricted to on-site use, and its latest loan.",
        annotations(
            read_only_hint = true,
            destructive_hint = false,
            open_world_hint = false
        )
    )]
    async fn loan_status(
        &self,
        Parameters(req): Parameters<McpLoanStatusRequest>,
    ) -> Result<CallToolResult, McpError> {
        let isbn = parse_isbn(&req.isbn)?;
        let desk = self.desk();
        let on_loan = desk.is_on_loan(&isbn).map_err(Self::to_mcp_error)?;
        let restricted = Desk::is_restricted_identifier(&isbn);
        let latest = desk.find_loan(&isbn).map_err(Self::to_mcp_error)?;

        let mut output = format!(
            "# {}\n\n- On loan: {}\n- On-site only: {}\n",
            isbn,
            yes_no(on_loan),
            yes_no(restricted)
        );
        if let Some(loan) = latest {
            output.push('\n');
            output.push_str(&render_receipt(&loan));
        }

        Ok(CallToolResult::success(vec![Content::text(output)]))
    }

    #[tool(
        name = "due_date",
        description = "Preview the return date for a book identifier and start date. Identifiers whose digits sum to 30 or less have no return date.",
        annotations(
            read_only_hint = true,
            destructive_hint = false,
            open_world_hint = false
        )
    )]
    async fn due_date(
        &self,
        Parameters(req): Parameters<McpDueDateRequest>,
    ) -> Result<CallToolResult, McpError> {
        let isbn = parse_isbn(&req.isbn)?;
        let start = parse_date(req.start_date.as_deref())?;
        Ok(CallToolResult::success(vec![Content::text(
            format_due_date(&isbn, start),
        )]))
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn yes_no(b: bool) -> &'static str {
    if b {
        "yes"
    } else {
        "no"
    }
}

fn format_due_date(isbn: &Isbn, start: NaiveDate) -> String {
    match Desk::compute_due_date(isbn, start) {
        Some(due) => format!(
            "{}: lent {} → return by {}",
            isbn,
            format_date(start),
            format_date(due)
        ),
        None => format!(
            "{}: no return date (digit sum {} ≤ {})",
            isbn,
            policy::digit_sum(isbn.as_str()),
            policy::DIGIT_SUM_THRESHOLD
        ),
    }
}

// =============================================================================
// Tests
// =============================================================================
