// src/services/scope.rs
//
// Quem enxerga quem. Funções puras: recebem o usuário logado explicitamente
// e o conjunto completo de usuários, e nunca falham.

use uuid::Uuid;

use crate::models::usuario::{Perfil, Usuario};

/// Conta protegida: só ela mesma (e como master) pode se editar ou excluir.
pub const PROTECTED_EMAIL: &str = "admin@coaching.com.br";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visao {
    /// Telas de cadastro/listagem de usuários
    Administracao,
    /// Equipe exibida no dashboard
    Equipe,
}

/// Colaboradores diretos de um gestor, na ordem da coleção.
pub fn colaboradores_de<'a>(gestor_id: Uuid, usuarios: &'a [Usuario]) -> Vec<&'a Usuario> {
    usuarios
        .iter()
        .filter(|u| u.perfil == Perfil::Colaborador && u.gestor_id == Some(gestor_id))
        .collect()
}

/// Gestores da carteira de um CS.
pub fn gestores_do_cs<'a>(cs_id: Uuid, usuarios: &'a [Usuario]) -> Vec<&'a Usuario> {
    usuarios
        .iter()
        .filter(|u| u.perfil == Perfil::Gestor && u.cs_id == Some(cs_id))
        .collect()
}

pub fn resolver_escopo<'a>(ator: &Usuario, usuarios: &'a [Usuario], visao: Visao) -> Vec<&'a Usuario> {
    match ator.perfil {
        Perfil::Master | Perfil::Dev => usuarios.iter().collect(),

        Perfil::Cs => match visao {
            Visao::Administracao => usuarios.iter().filter(|u| !u.perfil.is_interno()).collect(),
            Visao::Equipe => {
                let gestores = gestores_do_cs(ator.id, usuarios);
                usuarios
                    .iter()
                    .filter(|u| match u.perfil {
                        Perfil::Gestor => gestores.iter().any(|g| g.id == u.id),
                        Perfil::Colaborador => gestores.iter().any(|g| u.gestor_id == Some(g.id)),
                        Perfil::Master | Perfil::Dev | Perfil::Cs => false,
                    })
                    .collect()
            }
        },

        Perfil::Gestor => colaboradores_de(ator.id, usuarios),

        Perfil::Colaborador => match ator.gestor_id {
            Some(gestor_id) => usuarios
                .iter()
                .filter(|u| u.gestor_id == Some(gestor_id) && u.id != gestor_id)
                .collect(),
            // Sem gestor, só enxerga a si mesmo
            None => usuarios.iter().filter(|u| u.id == ator.id).collect(),
        },
    }
}

pub fn esta_no_escopo(ator: &Usuario, alvo_id: Uuid, usuarios: &[Usuario], visao: Visao) -> bool {
    resolver_escopo(ator, usuarios, visao)
        .iter()
        .any(|u| u.id == alvo_id)
}

fn is_conta_protegida(usuario: &Usuario) -> bool {
    usuario.email.trim().eq_ignore_ascii_case(PROTECTED_EMAIL)
}

/// Regra de edição/exclusão, avaliada no momento da ação e independente da visibilidade.
pub fn pode_editar_ou_excluir(ator: &Usuario, alvo: &Usuario) -> bool {
    if is_conta_protegida(alvo) {
        return ator.id == alvo.id && ator.perfil == Perfil::Master;
    }

    match ator.perfil {
        Perfil::Cs => !alvo.perfil.is_interno(),
        Perfil::Master | Perfil::Dev | Perfil::Gestor | Perfil::Colaborador => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_support::{colaborador_de, gestor, usuario};

    struct Cenario {
        todos: Vec<Usuario>,
        master: Usuario,
        cs: Usuario,
        gestor_a: Usuario,
        gestor_b: Usuario,
        col_a1: Usuario,
        col_a2: Usuario,
        col_b1: Usuario,
    }

    fn cenario() -> Cenario {
        let master = usuario(Perfil::Master, "master@interno.com");
        let dev = usuario(Perfil::Dev, "dev@interno.com");
        let cs = usuario(Perfil::Cs, "cs@interno.com");
        let mut gestor_a = gestor("gestor@acme.com", "Acme");
        gestor_a.cs_id = Some(cs.id);
        let gestor_b = gestor("gestor@beta.com", "Beta");
        let col_a1 = colaborador_de(&gestor_a, "a1@acme.com");
        let col_a2 = colaborador_de(&gestor_a, "a2@acme.com");
        let col_b1 = colaborador_de(&gestor_b, "b1@beta.com");

        let todos = vec![
            master.clone(),
            dev,
            cs.clone(),
            gestor_a.clone(),
            gestor_b.clone(),
            col_a1.clone(),
            col_a2.clone(),
            col_b1.clone(),
        ];
        Cenario { todos, master, cs, gestor_a, gestor_b, col_a1, col_a2, col_b1 }
    }

    fn ids(usuarios: &[&Usuario]) -> Vec<Uuid> {
        usuarios.iter().map(|u| u.id).collect()
    }

    #[test]
    fn colaborador_ve_colegas_e_a_si_mesmo_mas_nao_o_gestor() {
        let c = cenario();
        let escopo = resolver_escopo(&c.col_a1, &c.todos, Visao::Administracao);
        assert_eq!(ids(&escopo), vec![c.col_a1.id, c.col_a2.id]);
        assert!(!escopo.iter().any(|u| u.id == c.gestor_a.id));
    }

    #[test]
    fn colaborador_sem_gestor_ve_apenas_a_si_mesmo() {
        let c = cenario();
        let mut solto = usuario(Perfil::Colaborador, "solto@x.com");
        solto.gestor_id = None;
        let mut todos = c.todos.clone();
        todos.push(solto.clone());
        assert_eq!(ids(&resolver_escopo(&solto, &todos, Visao::Equipe)), vec![solto.id]);
    }

    #[test]
    fn gestor_ve_somente_os_proprios_colaboradores() {
        let c = cenario();
        let escopo = resolver_escopo(&c.gestor_a, &c.todos, Visao::Administracao);
        assert_eq!(ids(&escopo), vec![c.col_a1.id, c.col_a2.id]);
        assert!(!escopo.iter().any(|u| u.id == c.col_b1.id));
    }

    #[test]
    fn cs_na_administracao_nao_ve_perfis_internos() {
        let c = cenario();
        let escopo = resolver_escopo(&c.cs, &c.todos, Visao::Administracao);
        assert_eq!(escopo.len(), 5);
        assert!(escopo.iter().all(|u| !u.perfil.is_interno()));
    }

    #[test]
    fn cs_na_equipe_ve_a_propria_carteira() {
        let c = cenario();
        let escopo = resolver_escopo(&c.cs, &c.todos, Visao::Equipe);
        assert_eq!(ids(&escopo), vec![c.gestor_a.id, c.col_a1.id, c.col_a2.id]);
        assert!(!escopo.iter().any(|u| u.id == c.gestor_b.id));
    }

    #[test]
    fn master_e_dev_veem_todos() {
        let c = cenario();
        assert_eq!(resolver_escopo(&c.master, &c.todos, Visao::Administracao).len(), c.todos.len());
        let dev = c.todos[1].clone();
        assert_eq!(resolver_escopo(&dev, &c.todos, Visao::Equipe).len(), c.todos.len());
    }

    #[test]
    fn escopo_e_sempre_subconjunto_da_colecao() {
        let c = cenario();
        for ator in &c.todos {
            for visao in [Visao::Administracao, Visao::Equipe] {
                for u in resolver_escopo(ator, &c.todos, visao) {
                    assert!(c.todos.iter().any(|t| t.id == u.id));
                }
            }
        }
    }

    #[test]
    fn conta_protegida_so_pode_ser_alterada_por_ela_mesma_como_master() {
        let c = cenario();
        let protegida = usuario(Perfil::Master, PROTECTED_EMAIL);
        assert!(pode_editar_ou_excluir(&protegida, &protegida));
        assert!(!pode_editar_ou_excluir(&c.master, &protegida));

        let mut rebaixada = protegida.clone();
        rebaixada.perfil = Perfil::Dev;
        assert!(!pode_editar_ou_excluir(&rebaixada, &rebaixada));
    }

    #[test]
    fn email_protegido_compara_sem_diferenciar_maiusculas() {
        let c = cenario();
        let protegida = usuario(Perfil::Gestor, &PROTECTED_EMAIL.to_uppercase());
        assert!(!pode_editar_ou_excluir(&c.master, &protegida));
    }

    #[test]
    fn cs_nao_altera_perfis_internos() {
        let c = cenario();
        assert!(!pode_editar_ou_excluir(&c.cs, &c.master));
        assert!(!pode_editar_ou_excluir(&c.cs, &c.todos[1]));
        assert!(!pode_editar_ou_excluir(&c.cs, &c.cs));
        assert!(pode_editar_ou_excluir(&c.cs, &c.gestor_b));
        assert!(pode_editar_ou_excluir(&c.cs, &c.col_a1));
    }

    #[test]
    fn demais_combinacoes_sao_permitidas() {
        let c = cenario();
        assert!(pode_editar_ou_excluir(&c.master, &c.cs));
        assert!(pode_editar_ou_excluir(&c.gestor_a, &c.col_a1));
    }
}
