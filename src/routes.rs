// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, patch, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::AppState,
    docs::ApiDoc,
    handlers,
    middleware::auth::{auth_guard, tenant_guard},
};

pub fn build_router(app_state: AppState) -> Router {
    // Rotas públicas
    let public_routes = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/signup", post(handlers::auth::signup))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/convites/validar", get(handlers::convites::validate_invite))
        .route(
            "/api/convites-fundador/validar",
            get(handlers::convites::validate_founder_invite),
        );

    // Só JWT: a identidade ainda pode não pertencer a nenhuma clínica
    let identity_routes = Router::new()
        .route(
            "/api/auth/accept-founder-invite",
            post(handlers::auth::accept_founder_invite),
        )
        .route("/api/auth/accept-invite", post(handlers::auth::accept_invite))
        .route(
            "/api/convites-fundador",
            post(handlers::convites::create_founder_invite)
                .get(handlers::convites::list_founder_invites),
        )
        .route("/api/admin/identidades", get(handlers::admin::list_identidades))
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // JWT + usuário ativo numa clínica
    let clinic_routes = Router::new()
        .route("/api/usuarios/me", get(handlers::usuarios::get_me))
        .route("/api/usuarios", get(handlers::usuarios::list_usuarios))
        .route("/api/usuarios/{id}", delete(handlers::usuarios::deactivate_usuario))
        .route("/api/usuarios/{id}/papel", patch(handlers::usuarios::update_papel))
        .route(
            "/api/clinica",
            get(handlers::clinica::get_clinica).put(handlers::clinica::update_clinica),
        )
        .route(
            "/api/convites",
            post(handlers::convites::create_invite)
                .get(handlers::convites::list_invites)
                .put(handlers::convites::resend_invite),
        )
        .route("/api/convites/{id}", delete(handlers::convites::revoke_invite))
        .route(
            "/api/contas-bancarias",
            post(handlers::finance::create_conta).get(handlers::finance::list_contas),
        )
        .route(
            "/api/transacoes",
            post(handlers::finance::create_transacao).get(handlers::finance::list_transacoes),
        )
        .route("/api/transacoes/{id}", get(handlers::finance::get_transacao))
        .route(
            "/api/transacoes/{id}/reconciliar",
            post(handlers::finance::reconcile_transacao),
        )
        .route(
            "/api/transacoes/{id}/estornar",
            post(handlers::finance::refund_transacao),
        )
        .route("/api/parcelas/{id}/pagar", post(handlers::finance::pay_parcela))
        .route("/api/parcelas/{id}/cancelar", post(handlers::finance::cancel_parcela))
        .route(
            "/api/pacientes",
            post(handlers::pacientes::create_paciente).get(handlers::pacientes::list_pacientes),
        )
        .route(
            "/api/pacientes/{id}",
            get(handlers::pacientes::get_paciente)
                .put(handlers::pacientes::update_paciente)
                .delete(handlers::pacientes::deactivate_paciente),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            tenant_guard,
        ));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public_routes)
        .merge(identity_routes)
        .merge(clinic_routes)
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use chrono::{Duration, Utc};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::{
        config::Settings,
        db::{
            memory::{MemoryIdentityProvider, MemoryStore},
            IdentityProvider,
        },
        services::email::testing::RecordingEmailSender,
    };

    const ADMIN_PLATAFORMA: &str = "root@plataforma.com";
    const SENHA_ADMIN: &str = "senha-do-root";

    struct Ambiente {
        app: Router,
        store: MemoryStore,
        mailer: Arc<RecordingEmailSender>,
    }

    async fn ambiente() -> Ambiente {
        let identity = MemoryIdentityProvider::new();
        let root = identity
            .criar_identidade("Root", ADMIN_PLATAFORMA, SENHA_ADMIN)
            .await
            .unwrap();
        let settings = Settings::from_lookup(|key| match key {
            "DATABASE_URL" => Some("postgres://ignorado".into()),
            "JWT_SECRET" => Some("segredo-de-teste".into()),
            "APP_URL" => Some("https://app.teste".into()),
            "PLATFORM_ADMIN_IDS" => Some(root.id.to_string()),
            _ => None,
        })
        .unwrap();
        let store = MemoryStore::new();
        let mailer = Arc::new(RecordingEmailSender::default());
        let state = AppState::new(settings, Arc::new(store.clone()), Arc::new(identity), mailer.clone());
        Ambiente { app: build_router(state), store, mailer }
    }

    async fn chamar(
        app: &Router,
        metodo: &str,
        uri: &str,
        token: Option<&str>,
        corpo: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(metodo).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match corpo {
            Some(v) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };

        let resposta = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = resposta.status();
        let bytes = to_bytes(resposta.into_body(), usize::MAX).await.unwrap();
        let valor = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, valor)
    }

    async fn signup(app: &Router, nome: &str, email: &str) -> (String, String) {
        let (status, corpo) = chamar(
            app,
            "POST",
            "/api/auth/signup",
            None,
            Some(json!({ "name": nome, "email": email, "password": "segredo123" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        (
            corpo["userId"].as_str().unwrap().to_string(),
            corpo["token"].as_str().unwrap().to_string(),
        )
    }

    async fn login_admin(app: &Router) -> String {
        let (status, corpo) = chamar(
            app,
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": ADMIN_PLATAFORMA, "password": SENHA_ADMIN })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        corpo["token"].as_str().unwrap().to_string()
    }

    fn token_do_link(corpo: &Value) -> String {
        let url = corpo["inviteUrl"].as_str().unwrap();
        url.split("token=").nth(1).unwrap().to_string()
    }

    async fn registrar_clinica(app: &Router, email: &str) -> String {
        let (status, corpo) = chamar(
            app,
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "name": "Ana",
                "email": email,
                "password": "segredo123",
                "clinicName": "Clínica Sorriso"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        corpo["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn health_responde_sem_autenticacao() {
        let amb = ambiente().await;
        let resposta = amb
            .app
            .clone()
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resposta.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn rotas_protegidas_exigem_token() {
        let amb = ambiente().await;
        let (status, _) = chamar(&amb.app, "GET", "/api/pacientes", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = chamar(&amb.app, "GET", "/api/convites-fundador", Some("lixo"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn register_cria_clinica_e_admin() {
        let amb = ambiente().await;
        let (status, corpo) = chamar(
            &amb.app,
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "name": "Ana",
                "email": "ana@sorriso.com",
                "password": "segredo123",
                "clinicName": "Clínica Sorriso"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(corpo["user"]["papel"], "admin");
        assert_eq!(corpo["clinica"]["slug"], "clinica-sorriso");

        let token = corpo["token"].as_str().unwrap();
        let (status, me) = chamar(&amb.app, "GET", "/api/usuarios/me", Some(token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["clinica"]["nome"], "Clínica Sorriso");
    }

    #[tokio::test]
    async fn register_com_nome_de_clinica_em_branco_e_rejeitado() {
        let amb = ambiente().await;
        let (status, _) = chamar(
            &amb.app,
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "name": "Ana",
                "email": "ana@sorriso.com",
                "password": "segredo123",
                "clinicName": "   "
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(amb.store.snapshot().await.clinicas.is_empty());
    }

    #[tokio::test]
    async fn register_com_email_repetido_e_conflito() {
        let amb = ambiente().await;
        registrar_clinica(&amb.app, "ana@sorriso.com").await;
        let (status, _) = chamar(
            &amb.app,
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "name": "Outra Ana",
                "email": "ANA@sorriso.com",
                "password": "segredo123",
                "clinicName": "Outra Clínica"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(amb.store.snapshot().await.clinicas.len(), 1);
    }

    #[tokio::test]
    async fn fluxo_completo_do_convite_de_fundador() {
        let amb = ambiente().await;
        let token_admin = login_admin(&amb.app).await;

        let (status, emitido) = chamar(
            &amb.app,
            "POST",
            "/api/convites-fundador",
            Some(&token_admin),
            Some(json!({ "email": "fundadora@x.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(emitido["emailEnviado"], true);
        assert_eq!(amb.mailer.enviados().len(), 1);
        let convite_token = token_do_link(&emitido);

        let (status, validado) = chamar(
            &amb.app,
            "GET",
            &format!("/api/convites-fundador/validar?token={convite_token}"),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(validado["status"], "pendente");

        let (user_id, token) = signup(&amb.app, "Fernanda", "fundadora@x.com").await;

        // Sem clínica ainda
        let (status, _) = chamar(&amb.app, "GET", "/api/usuarios/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, aceito) = chamar(
            &amb.app,
            "POST",
            "/api/auth/accept-founder-invite",
            Some(&token),
            Some(json!({
                "token": convite_token,
                "clinicaNome": "Clínica X",
                "userId": user_id,
                "userName": "Fernanda"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, me) = chamar(&amb.app, "GET", "/api/usuarios/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["usuario"]["papel"], "admin");
        assert_eq!(me["clinica"]["id"], aceito["clinicaId"]);

        // Segundo resgate do mesmo link
        let (status, _) = chamar(
            &amb.app,
            "POST",
            "/api/auth/accept-founder-invite",
            Some(&token),
            Some(json!({
                "token": convite_token,
                "clinicaNome": "Clínica Y",
                "userId": user_id,
                "userName": "Fernanda"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn convite_de_fundador_exige_admin_da_plataforma() {
        let amb = ambiente().await;
        let (_, token) = signup(&amb.app, "Bruno", "bruno@x.com").await;
        let (status, _) = chamar(
            &amb.app,
            "POST",
            "/api/convites-fundador",
            Some(&token),
            Some(json!({ "email": "alguem@x.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn email_parecido_com_o_do_admin_nao_concede_acesso() {
        let amb = ambiente().await;

        // O e-mail exato já pertence à identidade do admin
        let (status, _) = chamar(
            &amb.app,
            "POST",
            "/api/auth/signup",
            None,
            Some(json!({ "name": "Intruso", "email": "ROOT@plataforma.com", "password": "segredo123" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        for email in ["root@plataforma.com.br", "admin@plataforma.com"] {
            let (_, token) = signup(&amb.app, "Intruso", email).await;
            let (status, _) = chamar(
                &amb.app,
                "POST",
                "/api/convites-fundador",
                Some(&token),
                Some(json!({ "email": "alguem@x.com" })),
            )
            .await;
            assert_eq!(status, StatusCode::FORBIDDEN);

            let (status, _) = chamar(&amb.app, "GET", "/api/admin/identidades", Some(&token), None).await;
            assert_eq!(status, StatusCode::FORBIDDEN);
        }
        assert!(amb.mailer.enviados().is_empty());

        let token_admin = login_admin(&amb.app).await;
        let (status, _) = chamar(&amb.app, "GET", "/api/admin/identidades", Some(&token_admin), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn convite_pendente_duplicado_e_conflito() {
        let amb = ambiente().await;
        let token_admin = login_admin(&amb.app).await;
        let corpo = json!({ "email": "fundadora@x.com" });

        let (status, _) =
            chamar(&amb.app, "POST", "/api/convites-fundador", Some(&token_admin), Some(corpo.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, _) =
            chamar(&amb.app, "POST", "/api/convites-fundador", Some(&token_admin), Some(corpo)).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn convite_expirado_responde_410() {
        let amb = ambiente().await;
        let token_admin = login_admin(&amb.app).await;
        let (_, emitido) = chamar(
            &amb.app,
            "POST",
            "/api/convites-fundador",
            Some(&token_admin),
            Some(json!({ "email": "fundadora@x.com" })),
        )
        .await;
        let convite_token = token_do_link(&emitido);
        amb.store
            .alterar(|e| e.convites_fundador[0].data_expiracao = Utc::now() - Duration::days(1))
            .await;

        let (user_id, token) = signup(&amb.app, "Fernanda", "fundadora@x.com").await;
        let (status, _) = chamar(
            &amb.app,
            "POST",
            "/api/auth/accept-founder-invite",
            Some(&token),
            Some(json!({
                "token": convite_token,
                "clinicaNome": "Clínica X",
                "userId": user_id,
                "userName": "Fernanda"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::GONE);
        assert!(amb.store.snapshot().await.clinicas.is_empty());
    }

    #[tokio::test]
    async fn convite_de_equipe_adiciona_membro_com_o_papel() {
        let amb = ambiente().await;
        let token_admin = registrar_clinica(&amb.app, "ana@sorriso.com").await;

        let (status, emitido) = chamar(
            &amb.app,
            "POST",
            "/api/convites",
            Some(&token_admin),
            Some(json!({ "email": "davi@sorriso.com", "papel": "dentista" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let convite_token = token_do_link(&emitido);

        let (user_id, token) = signup(&amb.app, "Davi", "davi@sorriso.com").await;
        let (status, _) = chamar(
            &amb.app,
            "POST",
            "/api/auth/accept-invite",
            Some(&token),
            Some(json!({ "token": convite_token, "userId": user_id, "userName": "Davi" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, me) = chamar(&amb.app, "GET", "/api/usuarios/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["usuario"]["papel"], "dentista");

        // Dentista lê pacientes, mas não gerencia a equipe nem escreve no financeiro
        let (status, _) = chamar(&amb.app, "GET", "/api/pacientes", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = chamar(
            &amb.app,
            "POST",
            "/api/convites",
            Some(&token),
            Some(json!({ "email": "outro@sorriso.com", "papel": "assistente" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = chamar(
            &amb.app,
            "POST",
            "/api/contas-bancarias",
            Some(&token),
            Some(json!({ "nome": "Caixa" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn pagamento_de_parcela_reconcilia_a_transacao() {
        let amb = ambiente().await;
        let token = registrar_clinica(&amb.app, "ana@sorriso.com").await;

        let (_, conta) = chamar(
            &amb.app,
            "POST",
            "/api/contas-bancarias",
            Some(&token),
            Some(json!({ "nome": "Caixa", "saldoInicial": 100 })),
        )
        .await;
        let (status, detalhe) = chamar(
            &amb.app,
            "POST",
            "/api/transacoes",
            Some(&token),
            Some(json!({
                "tipo": "receita",
                "descricao": "Clareamento",
                "valorBruto": 300,
                "totalParcelas": 2,
                "primeiroVencimento": "2026-11-10",
                "metodoPagamento": "pix",
                "contaBancariaId": conta["id"]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let parcela_id = detalhe["parcelas"][0]["id"].as_str().unwrap().to_string();

        // Corpo vazio: data de hoje e conta da transação
        let (status, pago) = chamar(
            &amb.app,
            "POST",
            &format!("/api/parcelas/{parcela_id}/pagar"),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(pago["parcela"]["status"], "pago");
        assert_eq!(pago["transacao"]["status"], "pendente");

        let (status, _) = chamar(
            &amb.app,
            "POST",
            &format!("/api/parcelas/{parcela_id}/pagar"),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
