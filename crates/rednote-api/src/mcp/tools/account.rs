//! Login tools.

use std::sync::Arc;

use async_trait::async_trait;
use rednote_core::actions::split_data_url;
use rednote_protocols::{RiskLevel, Tool, ToolContext, ToolDefinition, ToolError, ToolResult};

use super::failure;
use crate::service::XhsService;

/// Check whether the browser profile is logged in.
pub struct CheckLoginStatusTool {
    definition: ToolDefinition,
    service: Arc<XhsService>,
}

impl CheckLoginStatusTool {
    pub fn new(service: Arc<XhsService>) -> Self {
        Self {
            definition: ToolDefinition::new("check_login_status", "Check Login Status", "检查小红书登录状态"),
            service,
        }
    }
}

#[async_trait]
impl Tool for CheckLoginStatusTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, _params: serde_json::Value, _ctx: ToolContext) -> Result<ToolResult, ToolError> {
        Ok(match self.service.check_login_status().await {
            Ok(status) if status.is_logged_in => {
                let text = if status.username.is_empty() {
                    "已登录".to_string()
                } else {
                    format!("已登录\n用户名: {}", status.username)
                };
                ToolResult::success(text)
            }
            Ok(_) => ToolResult::success("未登录\n\n请使用 get_login_qrcode 工具获取二维码进行登录"),
            Err(e) => failure("检查登录状态失败", e),
        })
    }
}

/// Return a login QR code image and start watching for the scan.
pub struct GetLoginQrcodeTool {
    definition: ToolDefinition,
    service: Arc<XhsService>,
}

impl GetLoginQrcodeTool {
    pub fn new(service: Arc<XhsService>) -> Self {
        Self {
            definition: ToolDefinition::new(
                "get_login_qrcode",
                "Get Login QR Code",
                "获取登录二维码（返回 Base64 图片和超时时间）",
            ),
            service,
        }
    }
}

#[async_trait]
impl Tool for GetLoginQrcodeTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, _params: serde_json::Value, _ctx: ToolContext) -> Result<ToolResult, ToolError> {
        let qr = match self.service.get_login_qrcode().await {
            Ok(qr) => qr,
            Err(e) => return Ok(failure("获取登录二维码失败", e)),
        };
        if qr.is_logged_in {
            return Ok(ToolResult::success("你当前已处于登录状态"));
        }

        let text = format!("请用小红书 App 在 {} 内扫码登录 👇", qr.timeout);
        Ok(match split_data_url(&qr.img) {
            Some((mime_type, data)) => ToolResult::success(text).with_image(data, mime_type),
            None => ToolResult::success(format!("{text}\n\n{}", qr.img)),
        })
    }
}

/// Remove the cookie file, resetting the login.
pub struct DeleteCookiesTool {
    definition: ToolDefinition,
    service: Arc<XhsService>,
}

impl DeleteCookiesTool {
    pub fn new(service: Arc<XhsService>) -> Self {
        Self {
            definition: ToolDefinition::new(
                "delete_cookies",
                "Delete Cookies",
                "删除 cookies 文件，重置登录状态。删除后需要重新登录。",
            )
            .with_risk_level(RiskLevel::High),
            service,
        }
    }
}

#[async_trait]
impl Tool for DeleteCookiesTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, _params: serde_json::Value, _ctx: ToolContext) -> Result<ToolResult, ToolError> {
        Ok(match self.service.delete_cookies().await {
            Ok(resp) => ToolResult::success(format!("{}\n\n删除的文件路径: {}", resp.message, resp.cookie_path)),
            Err(e) => failure("删除 cookies 失败", e),
        })
    }
}
