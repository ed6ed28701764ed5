// src/services/usuario_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{RelatorioRepository, UsuarioRepository},
    models::usuario::{CreateUsuarioPayload, NovoUsuario, Perfil, UpdateUsuarioPayload, Usuario},
    services::{
        auth::normalize_email,
        scope::{self, Visao},
    },
};

fn texto_opcional(valor: Option<&str>) -> Option<String> {
    valor.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

/// Quem pode criar qual perfil.
pub fn pode_criar(ator: Perfil, alvo: Perfil) -> bool {
    match ator {
        Perfil::Master | Perfil::Dev => true,
        Perfil::Cs => matches!(alvo, Perfil::Gestor | Perfil::Colaborador),
        Perfil::Gestor => alvo == Perfil::Colaborador,
        Perfil::Colaborador => false,
    }
}

/// `csId` escolhido por master/dev. `cs` é o usuário já carregado desse id.
fn carteira_informada(
    ator: &Usuario,
    cs_id: Option<Uuid>,
    cs: Option<&Usuario>,
) -> Result<Option<Uuid>, AppError> {
    let Some(cs_id) = cs_id else {
        return Ok(None);
    };
    if !matches!(ator.perfil, Perfil::Master | Perfil::Dev) {
        return Err(AppError::Forbidden);
    }
    cs.filter(|c| c.id == cs_id && c.perfil == Perfil::Cs)
        .map(|c| Some(c.id))
        .ok_or(AppError::InvalidCs)
}

/// Aplica as regras de criação. `gestor` é o gestor já carregado do
/// colaborador que está sendo criado e `cs` o dono do `csId` informado.
pub fn planejar_criacao(
    ator: &Usuario,
    payload: &CreateUsuarioPayload,
    gestor: Option<&Usuario>,
    cs: Option<&Usuario>,
) -> Result<NovoUsuario, AppError> {
    if !pode_criar(ator.perfil, payload.perfil) {
        return Err(AppError::Forbidden);
    }

    let mut novo = NovoUsuario {
        email: normalize_email(&payload.email),
        nome: texto_opcional(payload.nome.as_deref()),
        telefone: texto_opcional(payload.telefone.as_deref()),
        nome_empresa: None,
        perfil: payload.perfil,
        gestor_id: None,
        cs_id: None,
    };

    match payload.perfil {
        Perfil::Gestor => {
            novo.nome_empresa = Some(
                texto_opcional(payload.nome_empresa.as_deref()).ok_or(AppError::CompanyNameRequired)?,
            );
            novo.cs_id = match (ator.perfil, payload.cs_id) {
                // CS só cadastra gestores na própria carteira
                (Perfil::Cs, Some(cs_id)) if cs_id != ator.id => return Err(AppError::Forbidden),
                (Perfil::Cs, _) => Some(ator.id),
                _ => carteira_informada(ator, payload.cs_id, cs)?,
            };
        }
        Perfil::Colaborador => {
            let gestor = gestor
                .filter(|g| g.perfil == Perfil::Gestor)
                .ok_or(AppError::InvalidManager)?;
            // Gestor só cadastra na própria equipe
            if ator.perfil == Perfil::Gestor && gestor.id != ator.id {
                return Err(AppError::Forbidden);
            }
            novo.gestor_id = Some(gestor.id);
            novo.nome_empresa = gestor.nome_empresa.clone();
        }
        Perfil::Master | Perfil::Dev | Perfil::Cs => {}
    }

    if payload.cs_id.is_some() && payload.perfil != Perfil::Gestor {
        return Err(AppError::InvalidCs);
    }

    Ok(novo)
}

/// Colaborador criado por gestor vai sempre para a equipe dele; o `gestorId` enviado é ignorado.
pub fn gestor_alvo(ator: &Usuario, payload: &CreateUsuarioPayload) -> Option<Uuid> {
    match (payload.perfil, ator.perfil) {
        (Perfil::Colaborador, Perfil::Gestor) => Some(ator.id),
        (Perfil::Colaborador, _) => payload.gestor_id,
        _ => None,
    }
}

/// Regra de edição/exclusão mais a exigência de o alvo estar no escopo
/// administrativo do ator (o próprio usuário sempre está).
/// Colaborador enxerga os colegas, mas só altera o próprio cadastro.
pub fn autorizar_acao(ator: &Usuario, alvo: &Usuario, usuarios: &[Usuario]) -> Result<(), AppError> {
    if !scope::pode_editar_ou_excluir(ator, alvo) {
        return Err(AppError::Forbidden);
    }
    if ator.perfil == Perfil::Colaborador && ator.id != alvo.id {
        return Err(AppError::Forbidden);
    }
    if ator.id != alvo.id && !scope::esta_no_escopo(ator, alvo.id, usuarios, Visao::Administracao) {
        return Err(AppError::UserNotFound);
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alteracao {
    pub nome: Option<String>,
    pub telefone: Option<String>,
    pub nome_empresa: Option<String>,
    /// Nova carteira de CS do gestor
    pub cs_id: Option<Uuid>,
    /// Se os colaboradores precisam receber o novo nome da empresa
    pub sincronizar_empresa: bool,
}

/// O nome da empresa só é editável no gestor; no colaborador ele é herdado.
/// A carteira de CS também só existe no gestor.
pub fn planejar_alteracao(
    ator: &Usuario,
    alvo: &Usuario,
    payload: &UpdateUsuarioPayload,
    cs: Option<&Usuario>,
) -> Result<Alteracao, AppError> {
    if payload.cs_id.is_some() && alvo.perfil != Perfil::Gestor {
        return Err(AppError::InvalidCs);
    }
    let cs_id = carteira_informada(ator, payload.cs_id, cs)?;

    let nome_empresa = match (alvo.perfil, payload.nome_empresa.as_deref()) {
        (Perfil::Colaborador, _) | (_, None) => None,
        (perfil, Some(valor)) => match texto_opcional(Some(valor)) {
            Some(nome) => Some(nome),
            None if perfil == Perfil::Gestor => return Err(AppError::CompanyNameRequired),
            None => None,
        },
    };

    let sincronizar_empresa = alvo.perfil == Perfil::Gestor
        && nome_empresa.is_some()
        && nome_empresa != alvo.nome_empresa;

    Ok(Alteracao {
        nome: texto_opcional(payload.nome.as_deref()),
        telefone: texto_opcional(payload.telefone.as_deref()),
        nome_empresa,
        cs_id,
        sincronizar_empresa,
    })
}

#[derive(Clone)]
pub struct UsuarioService {
    repo: UsuarioRepository,
    relatorio_repo: RelatorioRepository,
    pool: PgPool,
}

impl UsuarioService {
    pub fn new(repo: UsuarioRepository, relatorio_repo: RelatorioRepository, pool: PgPool) -> Self {
        Self { repo, relatorio_repo, pool }
    }

    pub async fn listar(&self, ator: &Usuario, visao: Visao) -> Result<Vec<Usuario>, AppError> {
        let usuarios = self.repo.list_all().await?;
        Ok(scope::resolver_escopo(ator, &usuarios, visao)
            .into_iter()
            .cloned()
            .collect())
    }

    async fn carregar_cs(&self, cs_id: Option<Uuid>) -> Result<Option<Usuario>, AppError> {
        match cs_id {
            Some(id) => self.repo.find_by_id(id).await,
            None => Ok(None),
        }
    }

    pub async fn criar(&self, ator: &Usuario, payload: &CreateUsuarioPayload) -> Result<Usuario, AppError> {
        let gestor = match gestor_alvo(ator, payload) {
            Some(gestor_id) => self.repo.find_by_id(gestor_id).await?,
            None => None,
        };

        let cs = self.carregar_cs(payload.cs_id).await?;

        let novo = planejar_criacao(ator, payload, gestor.as_ref(), cs.as_ref())?;
        let criado = self.repo.create(&self.pool, &novo).await?;

        tracing::info!(
            "👤 Usuário {} ({}) criado por {}",
            criado.email,
            criado.perfil.as_str(),
            ator.email
        );
        Ok(criado)
    }

    pub async fn atualizar(
        &self,
        ator: &Usuario,
        id: Uuid,
        payload: &UpdateUsuarioPayload,
    ) -> Result<Usuario, AppError> {
        let usuarios = self.repo.list_all().await?;
        let alvo = usuarios.iter().find(|u| u.id == id).ok_or(AppError::UserNotFound)?;
        autorizar_acao(ator, alvo, &usuarios)?;

        let cs = self.carregar_cs(payload.cs_id).await?;
        let alteracao = planejar_alteracao(ator, alvo, payload, cs.as_ref())?;

        let mut tx = self.pool.begin().await?;

        let atualizado = self
            .repo
            .update(
                &mut *tx,
                id,
                alteracao.nome.as_deref(),
                alteracao.telefone.as_deref(),
                alteracao.nome_empresa.as_deref(),
                alteracao.cs_id,
            )
            .await?
            .ok_or(AppError::UserNotFound)?;

        if alteracao.sincronizar_empresa {
            if let Some(nome_empresa) = atualizado.nome_empresa.as_deref() {
                let n = self.repo.sync_nome_empresa(&mut *tx, id, nome_empresa).await?;
                tracing::info!("🏢 Empresa '{}' propagada para {} colaborador(es)", nome_empresa, n);
            }
        }

        tx.commit().await?;
        Ok(atualizado)
    }

    /// Remove o usuário e os relatórios dele. Colaboradores de um gestor
    /// removido não são reatribuídos.
    pub async fn excluir(&self, ator: &Usuario, id: Uuid) -> Result<(), AppError> {
        let usuarios = self.repo.list_all().await?;
        let alvo = usuarios.iter().find(|u| u.id == id).ok_or(AppError::UserNotFound)?;
        autorizar_acao(ator, alvo, &usuarios)?;

        let mut tx = self.pool.begin().await?;
        let relatorios = self.relatorio_repo.delete_by_usuario(&mut *tx, id).await?;
        if !self.repo.delete(&mut *tx, id).await? {
            return Err(AppError::UserNotFound);
        }
        tx.commit().await?;

        tracing::info!("🗑️ Usuário {} removido por {} ({} relatório(s))", alvo.email, ator.email, relatorios);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_support::{colaborador_de, gestor, usuario};

    fn payload(perfil: Perfil) -> CreateUsuarioPayload {
        CreateUsuarioPayload {
            email: " Novo@Acme.com ".into(),
            nome: Some("Novo".into()),
            telefone: None,
            nome_empresa: None,
            perfil,
            gestor_id: None,
            cs_id: None,
        }
    }

    fn master() -> Usuario {
        usuario(Perfil::Master, "m@x.com")
    }

    #[test]
    fn matriz_de_criacao() {
        assert!(pode_criar(Perfil::Master, Perfil::Cs));
        assert!(pode_criar(Perfil::Dev, Perfil::Master));
        assert!(pode_criar(Perfil::Cs, Perfil::Gestor));
        assert!(!pode_criar(Perfil::Cs, Perfil::Dev));
        assert!(pode_criar(Perfil::Gestor, Perfil::Colaborador));
        assert!(!pode_criar(Perfil::Gestor, Perfil::Gestor));
        assert!(!pode_criar(Perfil::Colaborador, Perfil::Colaborador));
    }

    #[test]
    fn gestor_exige_nome_da_empresa() {
        let master = usuario(Perfil::Master, "m@x.com");
        let mut p = payload(Perfil::Gestor);
        p.nome_empresa = Some("   ".into());
        assert!(matches!(planejar_criacao(&master, &p, None, None), Err(AppError::CompanyNameRequired)));
    }

    #[test]
    fn gestor_criado_por_cs_entra_na_carteira() {
        let cs = usuario(Perfil::Cs, "cs@x.com");
        let mut p = payload(Perfil::Gestor);
        p.nome_empresa = Some(" Acme ".into());

        let novo = planejar_criacao(&cs, &p, None, None).expect("novo");

        assert_eq!(novo.cs_id, Some(cs.id));
        assert_eq!(novo.nome_empresa.as_deref(), Some("Acme"));
        assert_eq!(novo.email, "novo@acme.com");
    }

    #[test]
    fn colaborador_herda_empresa_do_gestor() {
        let g = gestor("g@acme.com", "Acme");
        let mut p = payload(Perfil::Colaborador);
        p.nome_empresa = Some("Outra".into());

        let novo = planejar_criacao(&g, &p, Some(&g), None).expect("novo");

        assert_eq!(novo.gestor_id, Some(g.id));
        assert_eq!(novo.nome_empresa.as_deref(), Some("Acme"));
    }

    #[test]
    fn colaborador_sem_gestor_valido_e_recusado() {
        let master = usuario(Perfil::Master, "m@x.com");
        let nao_gestor = usuario(Perfil::Cs, "cs@x.com");
        let p = payload(Perfil::Colaborador);
        assert!(matches!(planejar_criacao(&master, &p, None, None), Err(AppError::InvalidManager)));
        assert!(matches!(
            planejar_criacao(&master, &p, Some(&nao_gestor), None),
            Err(AppError::InvalidManager)
        ));
    }

    #[test]
    fn gestor_nao_cadastra_na_equipe_de_outro() {
        let g = gestor("g@acme.com", "Acme");
        let outro = gestor("o@beta.com", "Beta");
        let p = payload(Perfil::Colaborador);
        assert!(matches!(planejar_criacao(&g, &p, Some(&outro), None), Err(AppError::Forbidden)));
    }

    #[test]
    fn gestor_alvo_padrao_e_o_proprio_gestor() {
        let g = gestor("g@acme.com", "Acme");
        let mut p = payload(Perfil::Colaborador);
        p.gestor_id = Some(Uuid::new_v4());
        assert_eq!(gestor_alvo(&g, &p), Some(g.id));
        let master = usuario(Perfil::Master, "m@x.com");
        assert_eq!(gestor_alvo(&master, &payload(Perfil::Colaborador)), None);
        assert_eq!(gestor_alvo(&master, &payload(Perfil::Gestor)), None);
    }

    #[test]
    fn acao_fora_do_escopo_vira_nao_encontrado() {
        let g = gestor("g@acme.com", "Acme");
        let outro = gestor("o@beta.com", "Beta");
        let col_outro = colaborador_de(&outro, "c@beta.com");
        let usuarios = vec![g.clone(), outro, col_outro.clone()];
        assert!(matches!(autorizar_acao(&g, &col_outro, &usuarios), Err(AppError::UserNotFound)));
    }

    #[test]
    fn colaborador_nao_altera_nem_exclui_colega() {
        let g = gestor("g@acme.com", "Acme");
        let a = colaborador_de(&g, "a@acme.com");
        let b = colaborador_de(&g, "b@acme.com");
        let usuarios = vec![g, a.clone(), b.clone()];

        assert!(matches!(autorizar_acao(&a, &b, &usuarios), Err(AppError::Forbidden)));
        assert!(autorizar_acao(&a, &a, &usuarios).is_ok());
    }

    #[test]
    fn cs_nao_altera_master_mesmo_vendo() {
        let cs = usuario(Perfil::Cs, "cs@x.com");
        let master = usuario(Perfil::Master, "m@x.com");
        let usuarios = vec![cs.clone(), master.clone()];
        assert!(matches!(autorizar_acao(&cs, &master, &usuarios), Err(AppError::Forbidden)));
    }

    #[test]
    fn usuario_pode_alterar_a_si_mesmo() {
        let g = gestor("g@acme.com", "Acme");
        assert!(autorizar_acao(&g, &g, std::slice::from_ref(&g)).is_ok());
    }

    #[test]
    fn mudar_empresa_do_gestor_sincroniza_colaboradores() {
        let g = gestor("g@acme.com", "Acme");
        let p = UpdateUsuarioPayload { nome_empresa: Some("Acme S.A.".into()), ..Default::default() };

        let alteracao = planejar_alteracao(&master(), &g, &p, None).expect("alteração");

        assert_eq!(alteracao.nome_empresa.as_deref(), Some("Acme S.A."));
        assert!(alteracao.sincronizar_empresa);
    }

    #[test]
    fn mesmo_nome_de_empresa_nao_sincroniza() {
        let g = gestor("g@acme.com", "Acme");
        let p = UpdateUsuarioPayload { nome_empresa: Some("Acme".into()), ..Default::default() };
        assert!(!planejar_alteracao(&master(), &g, &p, None).expect("alteração").sincronizar_empresa);
    }

    #[test]
    fn colaborador_nao_muda_empresa_diretamente() {
        let g = gestor("g@acme.com", "Acme");
        let c = colaborador_de(&g, "c@acme.com");
        let p = UpdateUsuarioPayload { nome_empresa: Some("Outra".into()), ..Default::default() };

        let alteracao = planejar_alteracao(&master(), &c, &p, None).expect("alteração");

        assert_eq!(alteracao.nome_empresa, None);
        assert!(!alteracao.sincronizar_empresa);
    }

    #[test]
    fn gestor_nao_pode_ficar_sem_empresa() {
        let g = gestor("g@acme.com", "Acme");
        let p = UpdateUsuarioPayload { nome_empresa: Some("".into()), ..Default::default() };
        assert!(matches!(planejar_alteracao(&master(), &g, &p, None), Err(AppError::CompanyNameRequired)));
    }

    #[test]
    fn master_cria_gestor_na_carteira_de_um_cs() {
        let cs = usuario(Perfil::Cs, "cs@x.com");
        let mut p = payload(Perfil::Gestor);
        p.nome_empresa = Some("Acme".into());
        p.cs_id = Some(cs.id);

        let novo = planejar_criacao(&master(), &p, None, Some(&cs)).expect("novo");

        assert_eq!(novo.cs_id, Some(cs.id));
    }

    #[test]
    fn carteira_precisa_ser_de_um_cs() {
        let nao_cs = gestor("o@beta.com", "Beta");
        let mut p = payload(Perfil::Gestor);
        p.nome_empresa = Some("Acme".into());
        p.cs_id = Some(nao_cs.id);
        assert!(matches!(
            planejar_criacao(&master(), &p, None, Some(&nao_cs)),
            Err(AppError::InvalidCs)
        ));

        // id que não existe no banco
        p.cs_id = Some(Uuid::new_v4());
        assert!(matches!(planejar_criacao(&master(), &p, None, None), Err(AppError::InvalidCs)));
    }

    #[test]
    fn cs_nao_cadastra_gestor_na_carteira_de_outro() {
        let cs = usuario(Perfil::Cs, "cs@x.com");
        let outro_cs = usuario(Perfil::Cs, "cs2@x.com");
        let mut p = payload(Perfil::Gestor);
        p.nome_empresa = Some("Acme".into());
        p.cs_id = Some(outro_cs.id);
        assert!(matches!(
            planejar_criacao(&cs, &p, None, Some(&outro_cs)),
            Err(AppError::Forbidden)
        ));
    }

    #[test]
    fn carteira_so_vale_para_gestor() {
        let g = gestor("g@acme.com", "Acme");
        let cs = usuario(Perfil::Cs, "cs@x.com");
        let mut p = payload(Perfil::Colaborador);
        p.cs_id = Some(cs.id);
        assert!(matches!(
            planejar_criacao(&master(), &p, Some(&g), Some(&cs)),
            Err(AppError::InvalidCs)
        ));
    }

    #[test]
    fn master_move_gestor_para_outra_carteira() {
        let g = gestor("g@acme.com", "Acme");
        let cs = usuario(Perfil::Cs, "cs@x.com");
        let p = UpdateUsuarioPayload { cs_id: Some(cs.id), ..Default::default() };

        let alteracao = planejar_alteracao(&master(), &g, &p, Some(&cs)).expect("alteração");

        assert_eq!(alteracao.cs_id, Some(cs.id));
    }

    #[test]
    fn so_master_ou_dev_troca_a_carteira() {
        let g = gestor("g@acme.com", "Acme");
        let cs = usuario(Perfil::Cs, "cs@x.com");
        let p = UpdateUsuarioPayload { cs_id: Some(cs.id), ..Default::default() };
        assert!(matches!(planejar_alteracao(&cs, &g, &p, Some(&cs)), Err(AppError::Forbidden)));
        assert!(matches!(planejar_alteracao(&g, &g, &p, Some(&cs)), Err(AppError::Forbidden)));
    }
}
