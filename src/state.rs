//! 应用共享状态

use std::sync::Arc;

use crate::app::{
    app_permission::service::AppPermissionService, application::service::ApplicationService,
    batch_qrcode::service::BatchQrCodeService, data_collection::service::DataCollectionService,
    form::service::FormService, form_design::service::FormDesignService,
    qrcode::service::QrCodeService,
};
use crate::auth::{blacklist::TokenBlacklist, jwt::JwtManager, service::AuthService};
use crate::infrastructure::{config::Config, qr_image::QrImageRenderer};
use crate::rbac::service::RbacService;
use crate::store::PlatformStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PlatformStore>,
    pub applications: ApplicationService,
    pub qrcodes: QrCodeService,
    pub batches: BatchQrCodeService,
    pub forms: FormService,
    pub form_designs: FormDesignService,
    pub data_collections: DataCollectionService,
    pub app_permissions: AppPermissionService,
    pub auth: AuthService,
    pub rbac: RbacService,
}

impl AppState {
    pub fn new(config: &Config, store: Arc<dyn PlatformStore>) -> Self {
        let renderer = QrImageRenderer::new(&config.qrcode);
        let jwt = Arc::new(JwtManager::new(&config.jwt));
        let blacklist = TokenBlacklist::new();
        let rbac = RbacService::new(store.clone());

        Self {
            applications: ApplicationService::new(store.clone()),
            qrcodes: QrCodeService::new(store.clone(), renderer.clone()),
            batches: BatchQrCodeService::new(store.clone(), renderer),
            forms: FormService::new(store.clone()),
            form_designs: FormDesignService::new(store.clone()),
            data_collections: DataCollectionService::new(store.clone()),
            app_permissions: AppPermissionService::new(store.clone()),
            auth: AuthService::new(store.clone(), jwt, blacklist, rbac.clone(), &config.auth),
            rbac,
            store,
        }
    }
}
